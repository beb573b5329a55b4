//! Hero efficiency: team damage produced per unit of committed hero power.
//!
//! Built over a dense (match x hero) grid. Column 0 is the companion pet,
//! present in every match at a fixed nominal power.

use std::cmp::Ordering;

use serde::Serialize;

use crate::analysis::normalize::NormalizedMatch;
use crate::config::EngineConfig;
use crate::data::catalog::HeroCatalog;
use crate::error::AnalysisError;
use crate::lookup::resolve_hero;

const COMPANION_COLUMN: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroEfficiency {
    pub hero_id: u32,
    pub name: String,
    pub count: usize,
    /// `None` when the hero never appeared.
    pub average_power: Option<f64>,
    pub average_team_damage: Option<f64>,
    /// `average_team_damage / average_power`.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSummary {
    /// Catalog heroes ranked by descending score; heroes without data last.
    pub ranked: Vec<HeroEfficiency>,
    /// The always-present companion column, as a baseline.
    pub companion: HeroEfficiency,
}

/// Row-major `rows x cols` grid.
struct Grid {
    cols: usize,
    cells: Vec<f64>,
}

impl Grid {
    fn new(rows: usize, cols: usize) -> Self {
        Grid {
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.cols + col] = value;
    }

    fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().skip(col).step_by(self.cols).copied()
    }
}

/// Mean of the non-zero `values` over the rows where `presence` is 1.
fn mean_over_nonzero(values: &Grid, presence: &Grid, col: usize) -> Option<f64> {
    let (sum, count) = values
        .column(col)
        .zip(presence.column(col))
        .filter(|(value, present)| *present > 0.0 && *value > 0.0)
        .fold((0.0, 0usize), |(sum, count), (value, _)| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn efficiency(
    hero_id: u32,
    name: String,
    col: usize,
    power: &Grid,
    team_damage: &Grid,
    presence: &Grid,
) -> HeroEfficiency {
    let count = presence.column(col).filter(|present| *present > 0.0).count();
    let average_power = mean_over_nonzero(power, presence, col);
    let average_team_damage = mean_over_nonzero(team_damage, presence, col);
    let score = match (average_team_damage, average_power) {
        (Some(damage), Some(power)) if power > 0.0 => Some(damage / power),
        _ => None,
    };
    HeroEfficiency {
        hero_id,
        name,
        count,
        average_power,
        average_team_damage,
        score,
    }
}

fn by_score_descending(left: &HeroEfficiency, right: &HeroEfficiency) -> Ordering {
    match (left.score, right.score) {
        (Some(l), Some(r)) => r.total_cmp(&l),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn score_heroes(
    matches: &[NormalizedMatch],
    catalog: &HeroCatalog,
    config: &EngineConfig,
) -> Result<HeroSummary, AnalysisError> {
    let cols = catalog.hero_slots().max(COMPANION_COLUMN + 1);
    let rows = matches.len();
    let mut presence = Grid::new(rows, cols);
    let mut power = Grid::new(rows, cols);
    let mut team_damage = Grid::new(rows, cols);

    for (row, normalized) in matches.iter().enumerate() {
        let total = normalized.total_boss_damage as f64;
        presence.set(row, COMPANION_COLUMN, 1.0);
        power.set(row, COMPANION_COLUMN, config.companion_baseline_power);
        team_damage.set(row, COMPANION_COLUMN, total);

        for hero in &normalized.heroes {
            resolve_hero(catalog, hero.hero_id)?;
            let col = hero.hero_id as usize;
            presence.set(row, col, 1.0);
            power.set(row, col, hero.power as f64);
            team_damage.set(row, col, total);
        }
    }

    let mut ranked: Vec<HeroEfficiency> = catalog
        .heroes
        .iter()
        .enumerate()
        .skip(COMPANION_COLUMN + 1)
        .map(|(col, entry)| {
            efficiency(
                col as u32,
                entry.name.clone(),
                col,
                &power,
                &team_damage,
                &presence,
            )
        })
        .collect();
    ranked.sort_by(by_score_descending);

    let companion = efficiency(
        COMPANION_COLUMN as u32,
        "Companion".to_string(),
        COMPANION_COLUMN,
        &power,
        &team_damage,
        &presence,
    );

    Ok(HeroSummary { ranked, companion })
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use crate::analysis::normalize::HeroSlot;
    use crate::data::catalog::CatalogEntry;
    use crate::data::loose::OrderedMap;

    use super::*;

    fn hero(hero_id: u32, power: u64) -> HeroSlot {
        HeroSlot {
            hero_id,
            power,
            color: 0,
            hp: 0,
            magic_penetration: 0,
            armor_penetration: 0,
            favor_pet_id: 0,
            favor_power: 0,
        }
    }

    fn fight(total: u64, heroes: Vec<HeroSlot>) -> NormalizedMatch {
        NormalizedMatch {
            player_id: "p".to_string(),
            match_id: "m".to_string(),
            start_time: DateTime::from_timestamp(0, 0).expect("epoch"),
            ending_level: 95,
            progress: [0, total],
            bosses_fought: 1,
            total_boss_damage: total,
            heroes,
            pet: None,
            effects: OrderedMap::default(),
        }
    }

    fn catalog(n: usize) -> HeroCatalog {
        HeroCatalog {
            heroes: (0..n).map(|i| CatalogEntry::named(format!("H{i}"))).collect(),
            pets: Vec::new(),
        }
    }

    #[test]
    fn averages_only_cover_matches_where_the_hero_was_present() {
        let matches = vec![
            fight(1000, vec![hero(1, 100), hero(2, 200)]),
            fight(3000, vec![hero(1, 300)]),
        ];
        let summary = score_heroes(&matches, &catalog(4), &EngineConfig::default()).expect("score");

        let h1 = summary.ranked.iter().find(|h| h.hero_id == 1).expect("h1");
        assert_eq!(h1.count, 2);
        assert_eq!(h1.average_power, Some(200.0));
        assert_eq!(h1.average_team_damage, Some(2000.0));
        assert_eq!(h1.score, Some(10.0));

        let h2 = summary.ranked.iter().find(|h| h.hero_id == 2).expect("h2");
        assert_eq!(h2.count, 1);
        assert_eq!(h2.average_power, Some(200.0));
        assert_eq!(h2.score, Some(5.0));

        let h3 = summary.ranked.iter().find(|h| h.hero_id == 3).expect("h3");
        assert_eq!(h3.count, 0);
        assert_eq!(h3.average_power, None);
        assert_eq!(h3.score, None);

        let order: Vec<u32> = summary.ranked.iter().map(|h| h.hero_id).collect();
        assert_eq!(order, vec![1, 2, 3]);

        assert_eq!(summary.companion.count, 2);
        assert_eq!(summary.companion.average_power, Some(100_000.0));
        assert_eq!(summary.companion.average_team_damage, Some(2000.0));
    }

    #[test]
    fn zero_power_appearances_do_not_dilute_the_average() {
        let matches = vec![
            fight(600, vec![hero(1, 0)]),
            fight(1000, vec![hero(1, 200)]),
        ];
        let summary = score_heroes(&matches, &catalog(2), &EngineConfig::default()).expect("score");

        let h1 = summary.ranked.iter().find(|h| h.hero_id == 1).expect("h1");
        assert_eq!(h1.count, 2);
        assert_eq!(h1.average_power, Some(200.0));
        assert_eq!(h1.average_team_damage, Some(800.0));
        assert_eq!(h1.score, Some(4.0));
    }

    #[test]
    fn hero_outside_catalog_is_fatal() {
        let matches = vec![fight(10, vec![hero(9, 1)])];
        let err = score_heroes(&matches, &catalog(3), &EngineConfig::default()).expect_err("unknown");
        assert_eq!(err, AnalysisError::UnknownHero { id: 9 });
    }

    #[test]
    fn no_matches_yields_no_data_for_everyone() {
        let summary = score_heroes(&[], &catalog(3), &EngineConfig::default()).expect("score");
        assert_eq!(summary.ranked.len(), 2);
        assert!(summary.ranked.iter().all(|h| h.average_power.is_none() && h.count == 0));
        assert_eq!(summary.companion.score, None);
    }
}
