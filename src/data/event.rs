//! Raid event export: player summaries plus per-player, per-match boss logs.
//!
//! Layout: `{ date, results: [ (unused,) summary, minion matches, boss matches ] }`,
//! each result wrapping its payload in `result.response`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::data::loose::{self, OrderedMap};

#[derive(Debug, Clone, Deserialize)]
pub struct RawEventExport {
    #[serde(deserialize_with = "loose::i64")]
    pub date: i64,
    pub results: Vec<Value>,
}

/// A decoded event with the leading unused result (if any) discarded.
#[derive(Debug, Clone, Default)]
pub struct EventDataset {
    /// Unix seconds of the export.
    pub date: i64,
    /// Player id -> summary counters, in export order.
    pub summaries: OrderedMap<PlayerSummaryRecord>,
    /// Player id -> match id -> boss match.
    pub boss_matches: OrderedMap<OrderedMap<MatchRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerSummaryRecord {
    #[serde(rename = "bossDamage", default, deserialize_with = "loose::u64")]
    pub boss_damage: u64,
    #[serde(rename = "bossAttemptsSpent", default, deserialize_with = "loose::u32")]
    pub boss_attempts: u32,
    #[serde(rename = "nodesPoints", default, deserialize_with = "loose::u64")]
    pub minion_points: u64,
    #[serde(rename = "nodesAttemptsSpent", default, deserialize_with = "loose::u32")]
    pub minion_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "startTime", deserialize_with = "loose::i64")]
    pub start_time: i64,
    #[serde(default)]
    pub attackers: OrderedMap<AttackerRecord>,
    #[serde(default)]
    pub effects: EffectsRecord,
    pub result: MatchResultRecord,
    #[serde(default)]
    pub progress: Vec<ProgressRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttackerRecord {
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(deserialize_with = "loose::u64")]
    pub power: u64,
    #[serde(deserialize_with = "loose::u32")]
    pub color: u32,
    #[serde(deserialize_with = "loose::u64")]
    pub hp: u64,
    /// Omitted by the server when zero.
    #[serde(rename = "magicPenetration", default, deserialize_with = "loose::u64")]
    pub magic_penetration: u64,
    #[serde(rename = "armorPenetration", default, deserialize_with = "loose::u64")]
    pub armor_penetration: u64,
    #[serde(rename = "favorPetId", default, deserialize_with = "loose::u32")]
    pub favor_pet_id: u32,
    #[serde(rename = "favorPower", default, deserialize_with = "loose::u64")]
    pub favor_power: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EffectsRecord {
    #[serde(default)]
    pub attackers: OrderedMap<EffectMagnitude>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectMagnitude(pub f64);

impl<'de> Deserialize<'de> for EffectMagnitude {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        loose::f64(deserializer).map(EffectMagnitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchResultRecord {
    #[serde(deserialize_with = "loose::u32")]
    pub level: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub defenders: Option<ProgressDefenders>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressDefenders {
    #[serde(default)]
    pub heroes: OrderedMap<ProgressHero>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressHero {
    pub extra: Option<ProgressExtra>,
}

/// The two halves of a two-stage boss encounter. A stage not reached is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProgressExtra {
    #[serde(rename = "damageTaken", default, deserialize_with = "loose::u64")]
    pub damage_taken: u64,
    #[serde(rename = "damageTakenNextLevel", default, deserialize_with = "loose::u64")]
    pub damage_taken_next_level: u64,
}

impl MatchRecord {
    /// Boss progress of the first defender in the first progress block.
    pub fn boss_progress(&self) -> Option<ProgressExtra> {
        self.progress
            .first()?
            .defenders
            .as_ref()?
            .heroes
            .values()
            .next()?
            .extra
    }
}

#[derive(Debug, Deserialize)]
struct ResultEnvelope<T> {
    result: ResponseEnvelope<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope<T> {
    response: T,
}

impl RawEventExport {
    /// Split the results array into its summary and boss-match payloads.
    pub fn into_dataset(self) -> Result<EventDataset, String> {
        let mut results = self.results;
        let boss = match results.len() {
            3 | 4 => results.pop(),
            n => return Err(format!("expected 3 or 4 results, found {n}")),
        };
        let _minions = results.pop();
        let summary = results.pop();

        let summaries = match summary {
            Some(value) => unwrap_response::<OrderedMap<PlayerSummaryRecord>>(value)
                .map_err(|err| format!("summary result: {err}"))?,
            None => OrderedMap::default(),
        };
        let boss_matches = match boss {
            Some(value) => unwrap_response::<OrderedMap<OrderedMap<MatchRecord>>>(value)
                .map_err(|err| format!("boss match result: {err}"))?,
            None => OrderedMap::default(),
        };

        Ok(EventDataset {
            date: self.date,
            summaries,
            boss_matches,
        })
    }
}

fn unwrap_response<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    let envelope: ResultEnvelope<T> = serde_json::from_value(value)?;
    Ok(envelope.result.response)
}
