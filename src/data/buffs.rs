//! Buff catalog: an ordered list of effect keys (or key prefixes) with their
//! display name and gold price. Resolution is first-match-wins, so authors
//! list the most specific entries first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Exact,
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffCatalogEntry {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub gold: u64,
    /// Effect units granted per purchased tier; `None` for flat buffs.
    #[serde(default)]
    pub tier_size: Option<f64>,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
}

impl BuffCatalogEntry {
    pub fn matches(&self, effect_key: &str) -> bool {
        match self.match_mode {
            MatchMode::Exact => effect_key == self.key,
            MatchMode::Prefix => effect_key.starts_with(&self.key),
        }
    }

    /// True when every key this entry accepts is also accepted by `earlier`.
    fn is_captured_by(&self, earlier: &BuffCatalogEntry) -> bool {
        match earlier.match_mode {
            MatchMode::Exact => self.match_mode == MatchMode::Exact && self.key == earlier.key,
            MatchMode::Prefix => self.key.starts_with(&earlier.key),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffCatalog {
    #[serde(default)]
    pub buffs: Vec<BuffCatalogEntry>,
}

/// A catalog entry that can never match because an earlier entry captures
/// every key it would accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedEntry {
    pub index: usize,
    pub key: String,
    pub shadowed_by_index: usize,
    pub shadowed_by_key: String,
}

impl BuffCatalog {
    pub fn shadowed_entries(&self) -> Vec<ShadowedEntry> {
        let mut shadowed = Vec::new();
        for (index, entry) in self.buffs.iter().enumerate() {
            if let Some((earlier_index, earlier)) = self.buffs[..index]
                .iter()
                .enumerate()
                .find(|(_, earlier)| entry.is_captured_by(earlier))
            {
                shadowed.push(ShadowedEntry {
                    index,
                    key: entry.key.clone(),
                    shadowed_by_index: earlier_index,
                    shadowed_by_key: earlier.key.clone(),
                });
            }
        }
        shadowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, mode: MatchMode) -> BuffCatalogEntry {
        BuffCatalogEntry {
            key: key.to_string(),
            name: key.to_string(),
            gold: 0,
            tier_size: None,
            match_mode: mode,
        }
    }

    #[test]
    fn yaml_catalog_defaults_to_exact_matching() {
        let catalog: BuffCatalog = serde_yaml::from_str(
            "buffs:\n  - key: percentDamageBuff_any\n    name: Guild Morale\n  - key: heroBuff_\n    name: Hero Buff\n    gold: 40\n    tier_size: 10\n    match: prefix\n",
        )
        .expect("parse catalog");
        assert_eq!(catalog.buffs.len(), 2);
        assert_eq!(catalog.buffs[0].match_mode, MatchMode::Exact);
        assert_eq!(catalog.buffs[1].match_mode, MatchMode::Prefix);
        assert_eq!(catalog.buffs[1].tier_size, Some(10.0));
        assert!(catalog.buffs[1].matches("heroBuff_physicalAttack"));
        assert!(!catalog.buffs[0].matches("percentDamageBuff_anyX"));
    }

    #[test]
    fn broad_prefix_before_specific_entry_is_reported() {
        let catalog = BuffCatalog {
            buffs: vec![
                entry("stat_", MatchMode::Prefix),
                entry("stat_armor", MatchMode::Exact),
                entry("other", MatchMode::Exact),
            ],
        };
        let shadowed = catalog.shadowed_entries();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].key, "stat_armor");
        assert_eq!(shadowed[0].shadowed_by_key, "stat_");
    }

    #[test]
    fn specific_first_ordering_is_clean() {
        let catalog = BuffCatalog {
            buffs: vec![
                entry("stat_armor", MatchMode::Exact),
                entry("stat_", MatchMode::Prefix),
            ],
        };
        assert!(catalog.shadowed_entries().is_empty());
    }
}
