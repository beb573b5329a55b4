//! File loading for every input dataset. Decoding failures carry the path.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::data::buffs::BuffCatalog;
use crate::data::catalog::HeroCatalog;
use crate::data::event::{EventDataset, RawEventExport};
use crate::data::roster::{RawRosterExport, Roster};
use crate::error::LoadError;

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let raw = read(path)?;
    serde_json::from_str(&raw).map_err(|source| LoadError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

pub fn load_event(path: impl AsRef<Path>) -> Result<EventDataset, LoadError> {
    let path = path.as_ref();
    let raw: RawEventExport = read_json(path)?;
    raw.into_dataset().map_err(|reason| LoadError::Shape {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn load_roster(path: impl AsRef<Path>) -> Result<Roster, LoadError> {
    let path = path.as_ref();
    let raw: RawRosterExport = read_json(path)?;
    let roster = raw.into_roster().map_err(|reason| LoadError::Shape {
        path: path.to_path_buf(),
        reason,
    })?;
    if roster.snapshots.is_empty() {
        return Err(LoadError::Shape {
            path: path.to_path_buf(),
            reason: "no result carries clan.members".to_string(),
        });
    }
    Ok(roster)
}

pub fn load_hero_catalog(path: impl AsRef<Path>) -> Result<HeroCatalog, LoadError> {
    read_json(path.as_ref())
}

/// YAML by extension (`.yaml`/`.yml`), JSON otherwise.
pub fn load_buff_catalog(path: impl AsRef<Path>) -> Result<BuffCatalog, LoadError> {
    let path = path.as_ref();
    if !is_yaml(path) {
        return read_json(path);
    }
    let raw = read(path)?;
    serde_yaml::from_str(&raw).map_err(|source| LoadError::ParseYaml {
        path: path.to_path_buf(),
        source,
    })
}
