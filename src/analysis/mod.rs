//! Aggregation and scoring engine: one pass over the current event plus the
//! archived events, producing the tables of an [EventReport].

pub mod buffs;
pub mod detail;
pub mod heroes;
pub mod history;
pub mod normalize;
pub mod players;
pub mod tiers;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::data::buffs::BuffCatalog;
use crate::data::catalog::HeroCatalog;
use crate::data::event::EventDataset;
use crate::data::roster::Roster;
use crate::error::AnalysisError;
use crate::lookup::resolve_player;

pub use buffs::{compute_buff_economy, BuffEconomy, BuffFrequency, BuffPurchase, PlayerBuffs};
pub use detail::{match_detail, HeroDetail, MatchDetailRow, PetDetail};
pub use heroes::{score_heroes, HeroEfficiency, HeroSummary};
pub use history::{rollup_archives, HistoricalRollup};
pub use normalize::{normalize_event, normalize_match, rank_by_damage, NormalizedMatch};
pub use players::{aggregate_players, PlayerSummaryRow};
pub use tiers::{attribute_match, track_tiers, TierDamage};

/// Everything the engine reads for one run.
#[derive(Debug, Clone, Copy)]
pub struct EventInputs<'a> {
    pub event: &'a EventDataset,
    pub roster: &'a Roster,
    pub heroes: &'a HeroCatalog,
    pub buffs: &'a BuffCatalog,
    /// `(label, dataset)` per archived event, oldest first.
    pub archives: &'a [(String, EventDataset)],
}

/// Current-event tier damage next to the archived personal bests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierHistoryRow {
    pub player_id: String,
    pub name: Option<String>,
    pub current: BTreeMap<u32, u64>,
    pub best: Option<BTreeMap<u32, u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    /// `Asgard-<UTC timestamp>`, used as the workbook name.
    pub name: String,
    pub event_time: DateTime<Utc>,
    pub players: Vec<PlayerSummaryRow>,
    /// Ranked by descending total boss damage.
    pub matches: Vec<MatchDetailRow>,
    pub heroes: HeroSummary,
    pub buffs: BuffEconomy,
    pub tiers: TierDamage,
    pub history: HistoricalRollup,
    pub tier_rows: Vec<TierHistoryRow>,
}

pub fn report_name(event_time: &DateTime<Utc>) -> String {
    event_time.format("Asgard-%Y-%m-%dT%H:%M:%S").to_string()
}

/// Player Summary order first, then players only known from the archives.
fn tier_rows(
    players: &[PlayerSummaryRow],
    tiers: &TierDamage,
    history: &HistoricalRollup,
    roster: &Roster,
) -> Vec<TierHistoryRow> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();

    let listed = players.iter().map(|p| (p.player_id.as_str(), p.name.clone()));
    let archived_only = history
        .best
        .keys()
        .map(|id| (id.as_str(), resolve_player(roster, id).map(str::to_string)));

    for (player_id, name) in listed.chain(archived_only) {
        if !seen.insert(player_id) {
            continue;
        }
        rows.push(TierHistoryRow {
            player_id: player_id.to_string(),
            name,
            current: tiers.by_player.get(player_id).cloned().unwrap_or_default(),
            best: history.best.get(player_id).cloned(),
        });
    }
    rows
}

pub fn analyze_event(
    inputs: &EventInputs<'_>,
    config: &EngineConfig,
) -> Result<EventReport, AnalysisError> {
    let event_time = DateTime::<Utc>::from_timestamp(inputs.event.date, 0).ok_or(
        AnalysisError::InvalidEventDate {
            value: inputs.event.date,
        },
    )?;
    let name = report_name(&event_time);

    for shadowed in inputs.buffs.shadowed_entries() {
        warn!(
            key = shadowed.key.as_str(),
            index = shadowed.index,
            shadowed_by = shadowed.shadowed_by_key.as_str(),
            "buff catalog entry can never match"
        );
    }

    let matches = normalize_event(inputs.event)?;
    info!(report = name.as_str(), matches = matches.len(), "normalized boss matches");

    let players = aggregate_players(inputs.event, &matches, inputs.roster, config);
    let tiers = track_tiers(&matches, &config.difficulty_tiers)?;
    let heroes = score_heroes(&matches, inputs.heroes, config)?;
    let buffs = compute_buff_economy(&matches, inputs.buffs, config)?;

    let history = rollup_archives(
        inputs
            .archives
            .iter()
            .map(|(label, dataset)| (label.as_str(), dataset)),
        config,
    )?;

    let mut ranked = matches;
    rank_by_damage(&mut ranked);
    let match_rows = ranked
        .iter()
        .map(|normalized| match_detail(normalized, inputs.roster, inputs.heroes, config))
        .collect::<Result<Vec<_>, _>>()?;

    let tier_rows = tier_rows(&players, &tiers, &history, inputs.roster);

    info!(
        report = name.as_str(),
        players = players.len(),
        archives = history.archives.len(),
        "event analysed"
    );

    Ok(EventReport {
        name,
        event_time,
        players,
        matches: match_rows,
        heroes,
        buffs,
        tiers,
        history,
        tier_rows,
    })
}
