//! Match detail: normalized matches with every id resolved for display.

use serde::Serialize;

use crate::analysis::normalize::{HeroSlot, NormalizedMatch, PetSlot};
use crate::config::EngineConfig;
use crate::data::catalog::HeroCatalog;
use crate::data::roster::Roster;
use crate::error::AnalysisError;
use crate::lookup::{resolve_color, resolve_hero, resolve_pet, resolve_player};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroDetail {
    pub name: String,
    pub color: String,
    pub power: u64,
    pub hp: u64,
    pub magic_penetration: u64,
    pub armor_penetration: u64,
    /// `None` when the hero patronizes no pet.
    pub favor_pet: Option<String>,
    pub favor_power: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetDetail {
    pub name: String,
    pub color: String,
    pub power: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetailRow {
    pub player_id: String,
    pub player_name: Option<String>,
    pub match_id: String,
    pub start_time: String,
    pub replay_link: String,
    pub ending_level: u32,
    pub bosses_fought: usize,
    pub total_boss_damage: u64,
    pub progress: [u64; 2],
    pub morale: Option<f64>,
    /// Raw `key:magnitude` pairs joined by `,`.
    pub buffs: String,
    pub heroes: Vec<HeroDetail>,
    pub pet: Option<PetDetail>,
}

fn hero_detail(
    hero: &HeroSlot,
    catalog: &HeroCatalog,
    config: &EngineConfig,
) -> Result<HeroDetail, AnalysisError> {
    Ok(HeroDetail {
        name: resolve_hero(catalog, hero.hero_id)?.name.clone(),
        color: resolve_color(&config.color_ranks, hero.color)?.to_string(),
        power: hero.power,
        hp: hero.hp,
        magic_penetration: hero.magic_penetration,
        armor_penetration: hero.armor_penetration,
        favor_pet: resolve_pet(catalog, hero.favor_pet_id, config.pet_id_offset)?
            .map(|pet| pet.name.clone()),
        favor_power: hero.favor_power,
    })
}

fn pet_detail(
    pet: &PetSlot,
    catalog: &HeroCatalog,
    config: &EngineConfig,
) -> Result<Option<PetDetail>, AnalysisError> {
    let Some(entry) = resolve_pet(catalog, pet.pet_id, config.pet_id_offset)? else {
        return Ok(None);
    };
    Ok(Some(PetDetail {
        name: entry.name.clone(),
        color: resolve_color(&config.color_ranks, pet.color)?.to_string(),
        power: pet.power,
    }))
}

fn format_magnitude(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn match_detail(
    normalized: &NormalizedMatch,
    roster: &Roster,
    catalog: &HeroCatalog,
    config: &EngineConfig,
) -> Result<MatchDetailRow, AnalysisError> {
    let heroes = normalized
        .heroes
        .iter()
        .map(|hero| hero_detail(hero, catalog, config))
        .collect::<Result<Vec<_>, _>>()?;
    let pet = match &normalized.pet {
        Some(pet) => pet_detail(pet, catalog, config)?,
        None => None,
    };
    let buffs = normalized
        .effects
        .iter()
        .map(|(key, value)| format!("{key}:{}", format_magnitude(*value)))
        .collect::<Vec<_>>()
        .join(",");

    Ok(MatchDetailRow {
        player_id: normalized.player_id.clone(),
        player_name: resolve_player(roster, &normalized.player_id).map(str::to_string),
        match_id: normalized.match_id.clone(),
        start_time: normalized.start_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        replay_link: format!("{}{}", config.replay_url, normalized.match_id),
        ending_level: normalized.ending_level,
        bosses_fought: normalized.bosses_fought,
        total_boss_damage: normalized.total_boss_damage,
        progress: normalized.progress,
        morale: normalized.effect(&config.morale_effect_key),
        buffs,
        heroes,
        pet,
    })
}
