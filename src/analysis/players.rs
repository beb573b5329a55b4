//! Per-player aggregation: one row per player seen in the summary, the boss
//! matches, or the active roster.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::analysis::normalize::NormalizedMatch;
use crate::config::EngineConfig;
use crate::data::event::{EventDataset, PlayerSummaryRecord};
use crate::data::roster::Roster;
use crate::lookup::resolve_player;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummaryRow {
    pub player_id: String,
    pub name: Option<String>,
    /// False when the player has no summary record for the event.
    pub participated: bool,
    pub boss_damage: u64,
    pub boss_attempts: u32,
    pub minion_points: u64,
    pub minion_attempts: u32,
    /// Sum of the player's match totals, for cross-checking `boss_damage`.
    pub match_damage: u64,
}

impl PlayerSummaryRow {
    pub fn boss_quota_met(&self, config: &EngineConfig) -> bool {
        self.boss_attempts == config.max_boss_attempts
    }

    pub fn minion_quota_met(&self, config: &EngineConfig) -> bool {
        self.minion_attempts == config.max_minion_attempts
    }

    pub fn damage_consistent(&self) -> bool {
        self.boss_damage == self.match_damage
    }
}

fn row(
    player_id: &str,
    summary: Option<&PlayerSummaryRecord>,
    match_damage: u64,
    roster: &Roster,
) -> PlayerSummaryRow {
    let summary_or_zero = summary.cloned().unwrap_or_default();
    PlayerSummaryRow {
        player_id: player_id.to_string(),
        name: resolve_player(roster, player_id).map(str::to_string),
        participated: summary.is_some(),
        boss_damage: summary_or_zero.boss_damage,
        boss_attempts: summary_or_zero.boss_attempts,
        minion_points: summary_or_zero.minion_points,
        minion_attempts: summary_or_zero.minion_attempts,
        match_damage,
    }
}

/// Rows are keyed by player id and emitted once each: summary players first,
/// then players with matches but no summary, then roster members who did not
/// take part. The result is ordered by descending boss damage, stable.
pub fn aggregate_players(
    dataset: &EventDataset,
    matches: &[NormalizedMatch],
    roster: &Roster,
    config: &EngineConfig,
) -> Vec<PlayerSummaryRow> {
    let mut match_damage: HashMap<&str, u64> = HashMap::new();
    for normalized in matches {
        *match_damage.entry(normalized.player_id.as_str()).or_default() +=
            normalized.total_boss_damage;
    }

    let mut rows: Vec<PlayerSummaryRow> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |rows: &mut Vec<PlayerSummaryRow>, id: &str, summary: Option<&PlayerSummaryRecord>| {
        if !seen.insert(id.to_string()) {
            return;
        }
        let damage = match_damage.get(id).copied().unwrap_or(0);
        rows.push(row(id, summary, damage, roster));
    };

    for (player_id, summary) in dataset.summaries.iter() {
        push(&mut rows, player_id, Some(summary));
    }
    for normalized in matches {
        push(&mut rows, &normalized.player_id, None);
    }
    for player_id in roster.active_member_ids(config) {
        push(&mut rows, player_id, None);
    }

    for summary in &rows {
        if summary.name.is_none() {
            warn!(player_id = summary.player_id.as_str(), "player missing from roster");
        }
        if summary.participated && !summary.damage_consistent() {
            warn!(
                player_id = summary.player_id.as_str(),
                summary_damage = summary.boss_damage,
                match_damage = summary.match_damage,
                "summary boss damage disagrees with match totals"
            );
        }
    }

    rows.sort_by(|left, right| right.boss_damage.cmp(&left.boss_damage));
    rows
}
