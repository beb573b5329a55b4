//! Historical rollup: personal-best tier damage across archived events.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::analysis::normalize::normalize_event;
use crate::analysis::tiers::{track_tiers, TierDamage};
use crate::config::EngineConfig;
use crate::data::event::EventDataset;
use crate::error::AnalysisError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalRollup {
    /// Player id -> tier -> best single-event damage.
    pub best: BTreeMap<String, BTreeMap<u32, u64>>,
    /// Labels of the archives absorbed, in order.
    pub archives: Vec<String>,
}

impl HistoricalRollup {
    /// Fold one event's tier damage into the running maxima.
    pub fn absorb(&mut self, label: impl Into<String>, damage: &TierDamage) {
        for (player_id, tiers) in &damage.by_player {
            let best = self.best.entry(player_id.clone()).or_default();
            for (&tier, &amount) in tiers {
                best.entry(tier)
                    .and_modify(|current| *current = (*current).max(amount))
                    .or_insert(amount);
            }
        }
        self.archives.push(label.into());
    }

    pub fn get(&self, player_id: &str, tier: u32) -> Option<u64> {
        self.best.get(player_id)?.get(&tier).copied()
    }
}

/// Run the tier tracker over each archive independently and keep the maxima.
pub fn rollup_archives<'a, I>(archives: I, config: &EngineConfig) -> Result<HistoricalRollup, AnalysisError>
where
    I: IntoIterator<Item = (&'a str, &'a EventDataset)>,
{
    let mut rollup = HistoricalRollup::default();
    for (label, dataset) in archives {
        let matches = normalize_event(dataset)?;
        let damage = track_tiers(&matches, &config.difficulty_tiers)?;
        info!(
            archive = label,
            matches = matches.len(),
            players = damage.by_player.len(),
            "absorbed archived event"
        );
        rollup.absorb(label, &damage);
    }
    Ok(rollup)
}
