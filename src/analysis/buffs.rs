//! Buff economy: what each player bought for the event and what it cost.
//!
//! Buffs are taken from each player's first match only; they are bought once
//! per event and apply to every attempt.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::analysis::normalize::NormalizedMatch;
use crate::config::EngineConfig;
use crate::data::buffs::{BuffCatalog, BuffCatalogEntry};
use crate::error::AnalysisError;
use crate::lookup::resolve_buff;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffPurchase {
    pub effect_key: String,
    /// `None` when the key is not in the catalog.
    pub name: Option<String>,
    pub magnitude: f64,
    pub tiers: Option<u32>,
    pub gold: u64,
}

impl BuffPurchase {
    /// `name`, `name: N` for tiered buffs, or the raw key when unresolved.
    pub fn display(&self) -> String {
        let label = self.name.as_deref().unwrap_or(&self.effect_key);
        match self.tiers {
            Some(tiers) => format!("{label}: {tiers}"),
            None => label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.effect_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerBuffs {
    pub player_id: String,
    pub match_id: String,
    pub purchases: Vec<BuffPurchase>,
    pub total_gold: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffFrequency {
    pub label: String,
    pub resolved: bool,
    pub players: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuffEconomy {
    pub players: Vec<PlayerBuffs>,
    /// Descending player count; ties in first-seen order.
    pub frequency: Vec<BuffFrequency>,
}

/// `ceil(magnitude / tier_size)`, which must land in the configured range.
pub fn purchased_tiers(
    entry: &BuffCatalogEntry,
    effect_key: &str,
    magnitude: f64,
    tier_size: f64,
    config: &EngineConfig,
) -> Result<u32, AnalysisError> {
    if !(tier_size > 0.0) {
        return Err(AnalysisError::InvalidTierSize {
            name: entry.name.clone(),
            tier_size,
        });
    }
    let tiers = (magnitude / tier_size).ceil() as i64;
    let range = config.tier_purchase_range();
    match u32::try_from(tiers) {
        Ok(count) if range.contains(&count) => Ok(count),
        _ => Err(AnalysisError::TierPurchaseOutOfRange {
            key: effect_key.to_string(),
            magnitude,
            tier_size,
            tiers,
            min: *range.start(),
            max: *range.end(),
        }),
    }
}

pub fn price_buff(
    catalog: &BuffCatalog,
    effect_key: &str,
    magnitude: f64,
    config: &EngineConfig,
) -> Result<BuffPurchase, AnalysisError> {
    let Some(entry) = resolve_buff(catalog, effect_key) else {
        return Ok(BuffPurchase {
            effect_key: effect_key.to_string(),
            name: None,
            magnitude,
            tiers: None,
            gold: 0,
        });
    };

    let (tiers, gold) = match entry.tier_size {
        Some(tier_size) => {
            let tiers = purchased_tiers(entry, effect_key, magnitude, tier_size, config)?;
            (Some(tiers), u64::from(tiers) * entry.gold)
        }
        None if entry.gold != 0 => {
            return Err(AnalysisError::UntieredBuffHasCost {
                name: entry.name.clone(),
                gold: entry.gold,
            })
        }
        None => (None, 0),
    };

    Ok(BuffPurchase {
        effect_key: effect_key.to_string(),
        name: Some(entry.name.clone()),
        magnitude,
        tiers,
        gold,
    })
}

/// `matches` must be in export order so "first match" is the player's first.
pub fn compute_buff_economy(
    matches: &[NormalizedMatch],
    catalog: &BuffCatalog,
    config: &EngineConfig,
) -> Result<BuffEconomy, AnalysisError> {
    let mut seen_players: HashSet<&str> = HashSet::new();
    let mut players = Vec::new();
    let mut frequency: Vec<BuffFrequency> = Vec::new();

    for normalized in matches {
        if !seen_players.insert(normalized.player_id.as_str()) {
            continue;
        }

        let mut purchases = Vec::new();
        for (effect_key, &magnitude) in normalized.effects.iter() {
            if magnitude <= 0.0 {
                continue;
            }
            let purchase = price_buff(catalog, effect_key, magnitude, config)?;
            if purchase.name.is_none() {
                warn!(
                    player_id = normalized.player_id.as_str(),
                    effect_key, "unresolved buff"
                );
            }
            purchases.push(purchase);
        }

        let mut labels_for_player: HashSet<&str> = HashSet::new();
        for purchase in &purchases {
            if !labels_for_player.insert(purchase.label()) {
                continue;
            }
            match frequency.iter_mut().find(|f| f.label == purchase.label()) {
                Some(existing) => existing.players += 1,
                None => frequency.push(BuffFrequency {
                    label: purchase.label().to_string(),
                    resolved: purchase.name.is_some(),
                    players: 1,
                }),
            }
        }

        players.push(PlayerBuffs {
            player_id: normalized.player_id.clone(),
            match_id: normalized.match_id.clone(),
            total_gold: purchases.iter().map(|p| p.gold).sum(),
            purchases,
        });
    }

    frequency.sort_by(|left, right| right.players.cmp(&left.players));
    Ok(BuffEconomy { players, frequency })
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use crate::data::buffs::MatchMode;
    use crate::data::loose::OrderedMap;

    use super::*;

    fn entry(key: &str, name: &str, gold: u64, tier_size: Option<f64>, mode: MatchMode) -> BuffCatalogEntry {
        BuffCatalogEntry {
            key: key.to_string(),
            name: name.to_string(),
            gold,
            tier_size,
            match_mode: mode,
        }
    }

    fn catalog() -> BuffCatalog {
        BuffCatalog {
            buffs: vec![
                entry("percentDamageBuff_any", "Guild Morale", 0, None, MatchMode::Exact),
                entry("heroBuff_", "Hero Buff", 40, Some(10.0), MatchMode::Prefix),
            ],
        }
    }

    fn fight(player: &str, match_id: &str, effects: &[(&str, f64)]) -> NormalizedMatch {
        NormalizedMatch {
            player_id: player.to_string(),
            match_id: match_id.to_string(),
            start_time: DateTime::from_timestamp(0, 0).expect("epoch"),
            ending_level: 95,
            progress: [0, 0],
            bosses_fought: 0,
            total_boss_damage: 0,
            heroes: Vec::new(),
            pet: None,
            effects: effects.iter().map(|(k, v)| (k.to_string(), *v)).collect::<OrderedMap<f64>>(),
        }
    }

    #[test]
    fn tiers_round_up() {
        let config = EngineConfig::default();
        let hero_buff = &catalog().buffs[1];
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 25.0, 10.0, &config), Ok(3));
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 30.0, 10.0, &config), Ok(3));
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 0.5, 10.0, &config), Ok(1));
        assert!(purchased_tiers(hero_buff, "heroBuff_x", 51.0, 10.0, &config).is_err());
        assert!(purchased_tiers(hero_buff, "heroBuff_x", 10.0, 0.0, &config).is_err());
    }

    #[test]
    fn any_overshoot_buys_another_tier() {
        let config = EngineConfig::default();
        let hero_buff = &catalog().buffs[1];
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 5e-10, 1.0, &config), Ok(1));
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 10.000000001, 10.0, &config), Ok(2));
        assert_eq!(purchased_tiers(hero_buff, "heroBuff_x", 10.0, 10.0, &config), Ok(1));
    }

    #[test]
    fn costs_are_tiers_times_gold() {
        let purchase = price_buff(&catalog(), "heroBuff_attack", 25.0, &EngineConfig::default())
            .expect("price");
        assert_eq!(purchase.tiers, Some(3));
        assert_eq!(purchase.gold, 120);
        assert_eq!(purchase.display(), "Hero Buff: 3");
    }

    #[test]
    fn untiered_buff_with_gold_is_a_configuration_error() {
        let catalog = BuffCatalog {
            buffs: vec![entry("flat", "Flat", 10, None, MatchMode::Exact)],
        };
        let err = price_buff(&catalog, "flat", 1.0, &EngineConfig::default()).expect_err("gold");
        assert_eq!(
            err,
            AnalysisError::UntieredBuffHasCost {
                name: "Flat".to_string(),
                gold: 10
            }
        );
    }

    #[test]
    fn only_first_match_counts_and_frequency_is_per_player() {
        let matches = vec![
            fight("a", "a1", &[("percentDamageBuff_any", 30.0), ("heroBuff_attack", 20.0)]),
            fight("b", "b1", &[("percentDamageBuff_any", 30.0), ("mystery", 1.0), ("heroBuff_armor", 0.0)]),
            fight("a", "a2", &[("heroBuff_attack", 50.0)]),
        ];
        let economy = compute_buff_economy(&matches, &catalog(), &EngineConfig::default())
            .expect("economy");

        assert_eq!(economy.players.len(), 2);
        assert_eq!(economy.players[0].match_id, "a1");
        assert_eq!(economy.players[0].total_gold, 80);
        let displays: Vec<String> = economy.players[0].purchases.iter().map(|p| p.display()).collect();
        assert_eq!(displays, vec!["Guild Morale", "Hero Buff: 2"]);
        assert_eq!(economy.players[1].total_gold, 0);
        assert_eq!(economy.players[1].purchases.len(), 2);

        assert_eq!(economy.frequency[0].label, "Guild Morale");
        assert_eq!(economy.frequency[0].players, 2);
        let mystery = economy.frequency.iter().find(|f| f.label == "mystery").expect("mystery");
        assert!(!mystery.resolved);
        assert_eq!(mystery.players, 1);
    }
}
