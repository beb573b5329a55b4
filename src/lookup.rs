//! Entity lookup: resolves raw ids from the event export against the roster
//! and the reference catalogs.
//!
//! Lookups against data assumed complete (heroes, pets, colour ranks) return
//! [AnalysisError]; lookups whose absence is an expected degraded state
//! (players, buffs) return `None` and log.

use tracing::{debug, warn};

use crate::data::buffs::{BuffCatalog, BuffCatalogEntry};
use crate::data::catalog::{CatalogEntry, HeroCatalog};
use crate::data::roster::Roster;
use crate::error::AnalysisError;

pub fn resolve_player<'a>(roster: &'a Roster, player_id: &str) -> Option<&'a str> {
    let name = roster.member(player_id).map(|member| member.name.as_str());
    if name.is_none() {
        debug!(player_id, "player not found in any roster snapshot");
    }
    name
}

/// Index 0 is the catalog placeholder and never a real hero.
pub fn resolve_hero(catalog: &HeroCatalog, hero_id: u32) -> Result<&CatalogEntry, AnalysisError> {
    if hero_id == 0 {
        return Err(AnalysisError::UnknownHero { id: hero_id });
    }
    catalog
        .heroes
        .get(hero_id as usize)
        .ok_or(AnalysisError::UnknownHero { id: hero_id })
}

/// Pet id `0` means "no pet".
pub fn resolve_pet(
    catalog: &HeroCatalog,
    pet_id: u32,
    pet_id_offset: u32,
) -> Result<Option<&CatalogEntry>, AnalysisError> {
    if pet_id == 0 {
        return Ok(None);
    }
    let unknown = AnalysisError::UnknownPet {
        id: pet_id,
        offset: pet_id_offset,
    };
    let index = pet_id.checked_sub(pet_id_offset).ok_or_else(|| unknown.clone())?;
    catalog.pets.get(index as usize).map(Some).ok_or(unknown)
}

/// First matching entry in catalog order. A key accepted by more than one
/// entry is logged as ambiguous; the first entry still wins.
/// Every catalog entry matching `effect_key`, in catalog order.
pub fn buff_candidates<'a>(catalog: &'a BuffCatalog, effect_key: &str) -> Vec<&'a BuffCatalogEntry> {
    catalog
        .buffs
        .iter()
        .filter(|entry| entry.matches(effect_key))
        .collect()
}

pub fn resolve_buff<'a>(catalog: &'a BuffCatalog, effect_key: &str) -> Option<&'a BuffCatalogEntry> {
    let candidates = buff_candidates(catalog, effect_key);
    match candidates.split_first() {
        Some((entry, others)) => {
            if !others.is_empty() {
                let others: Vec<&str> = others.iter().map(|other| other.key.as_str()).collect();
                warn!(
                    effect_key,
                    chosen = entry.key.as_str(),
                    also_matching = ?others,
                    "ambiguous buff key"
                );
            }
            Some(*entry)
        }
        None => {
            debug!(effect_key, "buff key not in catalog");
            None
        }
    }
}

pub fn resolve_color(rank_table: &[String], rank: u32) -> Result<&str, AnalysisError> {
    rank_table
        .get(rank as usize)
        .map(String::as_str)
        .ok_or(AnalysisError::UnknownColor {
            rank,
            len: rank_table.len(),
        })
}
