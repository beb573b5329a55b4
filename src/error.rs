//! Error types. [AnalysisError] aborts a run; recoverable gaps never reach
//! this module and are carried as `None` sentinels instead.

use std::path::PathBuf;

use thiserror::Error;

/// Data the engine assumes complete turned out not to be. Always fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("hero id {id} is not in the hero catalog")]
    UnknownHero { id: u32 },

    #[error("pet id {id} is not in the pet catalog (offset {offset})")]
    UnknownPet { id: u32, offset: u32 },

    #[error("colour rank {rank} is outside the rank table ({len} entries); catalog version mismatch?")]
    UnknownColor { rank: u32, len: usize },

    #[error("difficulty level {level} is not in the tier sequence")]
    UnknownDifficulty { level: u32 },

    #[error("difficulty level {level} has no preceding tier in the sequence")]
    TierUnderflow { level: u32 },

    #[error(
        "buff '{key}' magnitude {magnitude} with tier size {tier_size} gives {tiers} purchased tiers, expected {min}..={max}"
    )]
    TierPurchaseOutOfRange {
        key: String,
        magnitude: f64,
        tier_size: f64,
        tiers: i64,
        min: u32,
        max: u32,
    },

    #[error("buff '{name}' has non-positive tier size {tier_size}")]
    InvalidTierSize { name: String, tier_size: f64 },

    #[error("untiered buff '{name}' has non-zero gold cost {gold}")]
    UntieredBuffHasCost { name: String, gold: u64 },

    #[error("player {player_id} match {match_id}: slot {slot} holds a '{kind}', expected a hero")]
    NonHeroInHeroSlot {
        player_id: String,
        match_id: String,
        slot: usize,
        kind: String,
    },

    #[error("player {player_id} match {match_id}: hero slot {slot} is empty")]
    MissingHeroSlot {
        player_id: String,
        match_id: String,
        slot: usize,
    },

    #[error("player {player_id} match {match_id}: companion slot holds a '{kind}', expected a pet")]
    NonPetInPetSlot {
        player_id: String,
        match_id: String,
        kind: String,
    },

    #[error("player {player_id} match {match_id}: attacker '{raw}' has no numeric id")]
    InvalidEntityId {
        player_id: String,
        match_id: String,
        raw: String,
    },

    #[error("player {player_id} match {match_id}: no boss progress block")]
    MissingBossProgress { player_id: String, match_id: String },

    #[error("event date {value} is not a valid unix timestamp")]
    InvalidEventDate { value: i64 },

    #[error("player {player_id} match {match_id}: start time {value} is not a valid unix timestamp")]
    InvalidStartTime {
        player_id: String,
        match_id: String,
        value: i64,
    },
}

/// Failure to read or decode one of the input files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML in {path}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unexpected layout in {path}: {reason}")]
    Shape { path: PathBuf, reason: String },
}

/// Failure while writing a rendered report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report output {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV sheet {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
}
