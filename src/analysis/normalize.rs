//! Flattens raw boss-match records into [NormalizedMatch].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::data::event::{AttackerRecord, EventDataset, MatchRecord};
use crate::data::loose::OrderedMap;
use crate::error::AnalysisError;

/// Attacker slots 0..HERO_SLOTS are heroes; the slot after them is the pet.
pub const HERO_SLOTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSlot {
    pub hero_id: u32,
    pub power: u64,
    pub color: u32,
    pub hp: u64,
    pub magic_penetration: u64,
    pub armor_penetration: u64,
    pub favor_pet_id: u32,
    pub favor_power: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetSlot {
    pub pet_id: u32,
    pub power: u64,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMatch {
    pub player_id: String,
    pub match_id: String,
    pub start_time: DateTime<Utc>,
    pub ending_level: u32,
    /// `[damageTaken, damageTakenNextLevel]`.
    pub progress: [u64; 2],
    pub bosses_fought: usize,
    pub total_boss_damage: u64,
    pub heroes: Vec<HeroSlot>,
    pub pet: Option<PetSlot>,
    /// Buff effect key -> magnitude, scoped to the attacking team.
    pub effects: OrderedMap<f64>,
}

impl NormalizedMatch {
    pub fn effect(&self, key: &str) -> Option<f64> {
        self.effects.get(key).copied()
    }
}

fn attacker_id(
    player_id: &str,
    match_id: &str,
    key: &str,
    attacker: &AttackerRecord,
) -> Result<u32, AnalysisError> {
    let raw = attacker.id.as_deref().unwrap_or(key);
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AnalysisError::InvalidEntityId {
            player_id: player_id.to_string(),
            match_id: match_id.to_string(),
            raw: raw.to_string(),
        })
}

pub fn normalize_match(
    player_id: &str,
    match_id: &str,
    record: &MatchRecord,
) -> Result<NormalizedMatch, AnalysisError> {
    let start_time = DateTime::<Utc>::from_timestamp(record.start_time, 0).ok_or_else(|| {
        AnalysisError::InvalidStartTime {
            player_id: player_id.to_string(),
            match_id: match_id.to_string(),
            value: record.start_time,
        }
    })?;

    // A missing block means the log is corrupt; a zero inside it means the
    // stage was not reached.
    let extra = record
        .boss_progress()
        .ok_or_else(|| AnalysisError::MissingBossProgress {
            player_id: player_id.to_string(),
            match_id: match_id.to_string(),
        })?;
    let progress = [extra.damage_taken, extra.damage_taken_next_level];

    let attackers: Vec<(&str, &AttackerRecord)> = record.attackers.iter().collect();
    let mut heroes = Vec::with_capacity(HERO_SLOTS);
    for slot in 0..HERO_SLOTS {
        let Some(&(key, attacker)) = attackers.get(slot) else {
            return Err(AnalysisError::MissingHeroSlot {
                player_id: player_id.to_string(),
                match_id: match_id.to_string(),
                slot,
            });
        };
        if attacker.kind != "hero" {
            return Err(AnalysisError::NonHeroInHeroSlot {
                player_id: player_id.to_string(),
                match_id: match_id.to_string(),
                slot,
                kind: attacker.kind.clone(),
            });
        }
        heroes.push(HeroSlot {
            hero_id: attacker_id(player_id, match_id, key, attacker)?,
            power: attacker.power,
            color: attacker.color,
            hp: attacker.hp,
            magic_penetration: attacker.magic_penetration,
            armor_penetration: attacker.armor_penetration,
            favor_pet_id: attacker.favor_pet_id,
            favor_power: attacker.favor_power,
        });
    }

    let pet = match attackers.get(HERO_SLOTS) {
        None => None,
        Some(&(_, attacker)) if attacker.kind != "pet" => {
            return Err(AnalysisError::NonPetInPetSlot {
                player_id: player_id.to_string(),
                match_id: match_id.to_string(),
                kind: attacker.kind.clone(),
            });
        }
        Some(&(key, attacker)) => Some(PetSlot {
            pet_id: attacker_id(player_id, match_id, key, attacker)?,
            power: attacker.power,
            color: attacker.color,
        }),
    };
    if attackers.len() > HERO_SLOTS + 1 {
        debug!(
            player_id,
            match_id,
            extra = attackers.len() - HERO_SLOTS - 1,
            "ignoring attackers past the pet slot"
        );
    }

    let effects = record
        .effects
        .attackers
        .iter()
        .map(|(key, magnitude)| (key.to_string(), magnitude.0))
        .collect();

    Ok(NormalizedMatch {
        player_id: player_id.to_string(),
        match_id: match_id.to_string(),
        start_time,
        ending_level: record.result.level,
        progress,
        bosses_fought: progress.iter().filter(|figure| **figure > 0).count(),
        total_boss_damage: progress.iter().sum(),
        heroes,
        pet,
        effects,
    })
}

/// Every boss match of the event in export order (players, then their matches).
pub fn normalize_event(dataset: &EventDataset) -> Result<Vec<NormalizedMatch>, AnalysisError> {
    let mut matches = Vec::new();
    for (player_id, player_matches) in dataset.boss_matches.iter() {
        for (match_id, record) in player_matches.iter() {
            matches.push(normalize_match(player_id, match_id, record)?);
        }
    }
    Ok(matches)
}

/// Descending total boss damage; ties keep export order.
pub fn rank_by_damage(matches: &mut [NormalizedMatch]) {
    matches.sort_by(|left, right| right.total_boss_damage.cmp(&left.total_boss_damage));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(attackers: serde_json::Value, progress: serde_json::Value) -> MatchRecord {
        serde_json::from_value(json!({
            "startTime": 1637585752,
            "attackers": attackers,
            "effects": {"attackers": {"percentDamageBuff_any": 25, "heroBuff_attack": "20"}},
            "result": {"level": 95},
            "progress": progress
        }))
        .expect("parse match")
    }

    fn five_heroes_and_pet() -> serde_json::Value {
        json!({
            "1": {"id": 1, "type": "hero", "power": 100, "color": 5, "hp": 10},
            "2": {"id": 2, "type": "hero", "power": 200, "color": 5, "hp": 10, "magicPenetration": 7},
            "3": {"id": 3, "type": "hero", "power": 300, "color": 5, "hp": 10, "favorPetId": 6001, "favorPower": 55},
            "4": {"id": 4, "type": "hero", "power": 400, "color": 5, "hp": 10},
            "5": {"id": 5, "type": "hero", "power": 500, "color": 5, "hp": 10},
            "6000": {"id": 6000, "type": "pet", "power": 900, "color": 4, "hp": 20}
        })
    }

    fn progress(first: u64, second: u64) -> serde_json::Value {
        json!([{"defenders": {"heroes": {"99": {"extra": {"damageTaken": first, "damageTakenNextLevel": second}}}}}])
    }

    #[test]
    fn normalizes_slots_progress_and_effects() {
        let normalized = normalize_match("42", "m1", &record(five_heroes_and_pet(), progress(800, 1200)))
            .expect("normalize");
        assert_eq!(normalized.bosses_fought, 2);
        assert_eq!(normalized.total_boss_damage, 2000);
        assert_eq!(normalized.heroes.len(), HERO_SLOTS);
        assert_eq!(normalized.heroes[1].magic_penetration, 7);
        assert_eq!(normalized.heroes[1].armor_penetration, 0);
        assert_eq!(normalized.heroes[2].favor_pet_id, 6001);
        assert_eq!(normalized.pet.as_ref().map(|p| p.pet_id), Some(6000));
        assert_eq!(normalized.effect("heroBuff_attack"), Some(20.0));
        assert_eq!(
            normalized.start_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2021-11-22T12:55:52"
        );
    }

    #[test]
    fn single_stage_counts_one_boss() {
        let normalized = normalize_match("42", "m1", &record(five_heroes_and_pet(), progress(0, 1200)))
            .expect("normalize");
        assert_eq!(normalized.bosses_fought, 1);
        assert_eq!(normalized.total_boss_damage, 1200);
    }

    #[test]
    fn pet_slot_may_be_absent() {
        let mut attackers = five_heroes_and_pet();
        attackers.as_object_mut().expect("object").remove("6000");
        let normalized =
            normalize_match("42", "m1", &record(attackers, progress(1, 1))).expect("normalize");
        assert!(normalized.pet.is_none());
    }

    #[test]
    fn pet_in_hero_slot_is_fatal() {
        let attackers = json!({
            "1": {"id": 1, "type": "hero", "power": 1, "color": 1, "hp": 1},
            "6000": {"id": 6000, "type": "pet", "power": 1, "color": 1, "hp": 1},
            "2": {"id": 2, "type": "hero", "power": 1, "color": 1, "hp": 1},
            "3": {"id": 3, "type": "hero", "power": 1, "color": 1, "hp": 1},
            "4": {"id": 4, "type": "hero", "power": 1, "color": 1, "hp": 1}
        });
        let err = normalize_match("42", "m1", &record(attackers, progress(1, 1))).expect_err("pet in slot 1");
        assert!(matches!(err, AnalysisError::NonHeroInHeroSlot { slot: 1, .. }));
    }

    #[test]
    fn short_team_is_fatal() {
        let attackers = json!({"1": {"id": 1, "type": "hero", "power": 1, "color": 1, "hp": 1}});
        let err = normalize_match("42", "m1", &record(attackers, progress(1, 1))).expect_err("one hero");
        assert!(matches!(err, AnalysisError::MissingHeroSlot { slot: 1, .. }));
    }

    #[test]
    fn missing_progress_block_is_fatal() {
        let err = normalize_match("42", "m1", &record(five_heroes_and_pet(), json!([])))
            .expect_err("no progress");
        assert!(matches!(err, AnalysisError::MissingBossProgress { .. }));
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let base = normalize_match("42", "m1", &record(five_heroes_and_pet(), progress(0, 1)))
            .expect("normalize");
        let with = |id: &str, total: u64| NormalizedMatch {
            match_id: id.to_string(),
            total_boss_damage: total,
            ..base.clone()
        };
        let mut matches = vec![with("a", 500), with("b", 2000), with("c", 1000), with("d", 2000)];
        rank_by_damage(&mut matches);
        let order: Vec<&str> = matches.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "c", "a"]);
    }
}
