//! Difficulty-tier tracker: boss damage per player per difficulty tier.
//!
//! Only the ending tier of a match is recorded. The second progress figure
//! belongs to that tier and the first to the position before it in the tier
//! sequence, since a boss that caps mid-match rolls over to the next tier.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::normalize::NormalizedMatch;
use crate::error::AnalysisError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierDamage {
    /// Player id -> tier -> summed damage.
    pub by_player: BTreeMap<String, BTreeMap<u32, u64>>,
}

impl TierDamage {
    pub fn get(&self, player_id: &str, tier: u32) -> Option<u64> {
        self.by_player.get(player_id)?.get(&tier).copied()
    }

    pub fn player_total(&self, player_id: &str) -> u64 {
        self.by_player
            .get(player_id)
            .map(|tiers| tiers.values().sum())
            .unwrap_or(0)
    }

    fn add(&mut self, player_id: &str, tier: u32, damage: u64) {
        *self
            .by_player
            .entry(player_id.to_string())
            .or_default()
            .entry(tier)
            .or_default() += damage;
    }
}

/// `(tier, damage)` pairs for one match, ending tier first.
///
/// At the cap the sequence repeats its last value, so the ending tier is
/// located by its last occurrence. A zero first figure at the bottom of the
/// sequence has nothing to attribute and does not step out of bounds.
pub fn attribute_match(
    tiers: &[u32],
    ending_level: u32,
    progress: [u64; 2],
) -> Result<Vec<(u32, u64)>, AnalysisError> {
    let position = tiers
        .iter()
        .rposition(|tier| *tier == ending_level)
        .ok_or(AnalysisError::UnknownDifficulty {
            level: ending_level,
        })?;
    let [first, second] = progress;

    let mut attributed = vec![(tiers[position], second)];
    match position.checked_sub(1) {
        Some(previous) => attributed.push((tiers[previous], first)),
        None if first > 0 => {
            return Err(AnalysisError::TierUnderflow {
                level: ending_level,
            })
        }
        None => {}
    }
    Ok(attributed)
}

pub fn track_tiers(
    matches: &[NormalizedMatch],
    tiers: &[u32],
) -> Result<TierDamage, AnalysisError> {
    let mut damage = TierDamage::default();
    for normalized in matches {
        for (tier, amount) in attribute_match(tiers, normalized.ending_level, normalized.progress)? {
            damage.add(&normalized.player_id, tier, amount);
        }
    }
    Ok(damage)
}
