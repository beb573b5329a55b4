//! Hero and pet reference data: `{ heroes: [..], pets: [..] }`.
//!
//! Both lists are indexed by position. Hero index 0 is a placeholder (it
//! doubles as the companion column of the efficiency matrix); pet index is
//! the pet id minus the configured pet offset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCatalogEntry {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        role: Option<String>,
    },
}

impl<'de> Deserialize<'de> for CatalogEntry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawCatalogEntry::deserialize(deserializer)? {
            RawCatalogEntry::Name(name) => CatalogEntry { name, role: None },
            RawCatalogEntry::Full { name, role } => CatalogEntry { name, role },
        })
    }
}

impl CatalogEntry {
    pub fn named(name: impl Into<String>) -> Self {
        CatalogEntry {
            name: name.into(),
            role: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroCatalog {
    #[serde(default)]
    pub heroes: Vec<CatalogEntry>,
    #[serde(default)]
    pub pets: Vec<CatalogEntry>,
}

impl HeroCatalog {
    /// Number of hero columns including the placeholder at index 0.
    pub fn hero_slots(&self) -> usize {
        self.heroes.len()
    }
}
