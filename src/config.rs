//! Engine configuration: attempt quotas, tier sequence, id offsets and the
//! other game constants, passed explicitly into the analysis.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

pub const DEFAULT_REPLAY_URL: &str = "https://hero-wars.com?replay_id=";
pub const DEFAULT_MORALE_EFFECT_KEY: &str = "percentDamageBuff_any";

const DEFAULT_DIFFICULTY_TIERS: &[u32] = &[65, 75, 85, 95, 105, 115, 130, 145, 160, 160];

const DEFAULT_COLOR_RANKS: &[&str] = &[
    "NONE", "W", "G", "G+1", "B", "B+1", "B+2", "V", "V+1", "V+2", "V+3", "O", "O+1", "O+2", "O+3",
    "O+4", "R", "R+1", "R+2",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_boss_attempts: u32,
    pub max_minion_attempts: u32,
    /// Ascending, possibly repeating at the cap. Both progress figures of a
    /// match belong to its ending tier and the position before it.
    pub difficulty_tiers: Vec<u32>,
    pub pet_id_offset: u32,
    pub color_ranks: Vec<String>,
    /// Nominal power assigned to the companion column of the hero matrix.
    pub companion_baseline_power: f64,
    pub tier_purchase_min: u32,
    pub tier_purchase_max: u32,
    pub replay_url: String,
    pub morale_effect_key: String,
    /// Clan roles excluded from the active roster (e.g. applicants).
    pub inactive_roles: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_boss_attempts: 5,
            max_minion_attempts: 9,
            difficulty_tiers: DEFAULT_DIFFICULTY_TIERS.to_vec(),
            pet_id_offset: 6000,
            color_ranks: DEFAULT_COLOR_RANKS.iter().map(|s| s.to_string()).collect(),
            companion_baseline_power: 100_000.0,
            tier_purchase_min: 1,
            tier_purchase_max: 5,
            replay_url: DEFAULT_REPLAY_URL.to_string(),
            morale_effect_key: DEFAULT_MORALE_EFFECT_KEY.to_string(),
            inactive_roles: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn tier_purchase_range(&self) -> RangeInclusive<u32> {
        self.tier_purchase_min..=self.tier_purchase_max
    }

    /// Distinct tiers in sequence order, for report columns.
    pub fn distinct_tiers(&self) -> Vec<u32> {
        let mut tiers = self.difficulty_tiers.clone();
        tiers.dedup();
        tiers
    }

    pub fn is_active_role(&self, role: Option<&str>) -> bool {
        match role {
            Some(role) => !self
                .inactive_roles
                .iter()
                .any(|inactive| inactive.eq_ignore_ascii_case(role.trim())),
            None => true,
        }
    }
}

/// Load an override file. Keys missing from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, LoadError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = serde_yaml::from_str(&raw).map_err(|source| LoadError::ParseYaml {
        path: path.to_path_buf(),
        source,
    })?;
    if config.difficulty_tiers.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(LoadError::Shape {
            path: path.to_path_buf(),
            reason: "difficulty_tiers must be non-decreasing".to_string(),
        });
    }
    if config.tier_purchase_min > config.tier_purchase_max {
        return Err(LoadError::Shape {
            path: path.to_path_buf(),
            reason: "tier_purchase_min exceeds tier_purchase_max".to_string(),
        });
    }
    Ok(config)
}
