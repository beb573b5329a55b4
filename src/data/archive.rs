//! Archived event discovery: `dir/Asgard-*.json` style patterns where the
//! file-name component may contain `*` and `?` wildcards.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::data::event::EventDataset;
use crate::data::loader::load_event;
use crate::error::LoadError;

/// Files in the pattern's directory whose names match, sorted by name.
/// A missing directory yields no archives; read failures are logged and skipped.
pub fn discover_archives(pattern: &str) -> Vec<PathBuf> {
    let pattern_path = Path::new(pattern);
    let Some(file_pattern) = pattern_path.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };
    let dir = match pattern_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Vec::new();
    }

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "archive directory unreadable");
            return Vec::new();
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        let is_file = match entry.file_type() {
            Ok(file_type) => file_type.is_file(),
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "skipping entry without a file type");
                continue;
            }
        };
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| wildcard_match(file_pattern, name))
            .unwrap_or(false);
        if is_file && matches {
            paths.push(entry.path());
        }
    }
    paths.sort();
    paths
}

/// Load every archive matching `pattern`, in discovery order.
pub fn load_archives(pattern: &str) -> Result<Vec<(PathBuf, EventDataset)>, LoadError> {
    discover_archives(pattern)
        .into_iter()
        .map(|path| load_event(&path).map(|dataset| (path, dataset)))
        .collect()
}

/// `*` matches any run of characters, `?` exactly one.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    n = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
