//! Lays an [EventReport] out as workbook sheets and attaches the cell
//! annotations: errors for per-cell anomalies, warnings for notable absence.

use std::collections::{BTreeMap, HashMap};

use crate::analysis::{
    BuffPurchase, EventReport, HeroDetail, HeroEfficiency, MatchDetailRow, PetDetail,
    PlayerSummaryRow, TierHistoryRow,
};
use crate::config::EngineConfig;
use crate::report::model::{Cell, Sheet, Workbook};

pub const PLAYER_SUMMARY: &str = "Player Summary";
pub const MATCH_DETAIL: &str = "Match Detail";
pub const HERO_SUMMARY: &str = "Hero Summary";
pub const BUFF_SUMMARY: &str = "Buff Summary";
pub const BUFF_FREQUENCY: &str = "Buff Frequency";
pub const TIER_DAMAGE: &str = "Tier Damage";
pub const HISTORICAL_SUMMARY: &str = "Historical Summary";

const NO_DATA: &str = "no data";
const HERO_BLOCKS: usize = 5;

const HERO_COLUMNS: [&str; 8] = [
    "Name",
    "Color",
    "Power",
    "HP",
    "Magic Penetration",
    "Armor Penetration",
    "Patroned Pet",
    "Patron Power",
];

fn player_cell(player_id: &str, name: Option<&str>) -> Cell {
    match name {
        Some(name) => Cell::text(name),
        None => Cell::text(format!("Unknown player: {player_id}")).error(),
    }
}

fn quota_cell(attempts: u32, quota: u32, participated: bool) -> Cell {
    let cell = Cell::integer(attempts);
    match (attempts == quota, participated) {
        (true, _) => cell,
        (false, true) => cell.error(),
        (false, false) => cell.warning(),
    }
}

fn player_summary(players: &[PlayerSummaryRow], config: &EngineConfig) -> Sheet {
    let mut sheet = Sheet::new(
        PLAYER_SUMMARY,
        [
            "Player ID",
            "Player",
            "Boss Damage",
            "Boss Attempts",
            "Minion Points",
            "Minion Attempts",
            "Match Damage",
        ],
    );
    for row in players {
        let match_damage = Cell::integer(row.match_damage);
        sheet.push(vec![
            Cell::text(&row.player_id),
            player_cell(&row.player_id, row.name.as_deref()),
            Cell::integer(row.boss_damage),
            quota_cell(row.boss_attempts, config.max_boss_attempts, row.participated),
            Cell::integer(row.minion_points),
            quota_cell(row.minion_attempts, config.max_minion_attempts, row.participated),
            if row.participated && !row.damage_consistent() {
                match_damage.warning()
            } else {
                match_damage
            },
        ]);
    }
    sheet
}

fn hero_block(hero: Option<&HeroDetail>) -> Vec<Cell> {
    let Some(hero) = hero else {
        return vec![Cell::empty().error(); HERO_COLUMNS.len()];
    };
    vec![
        Cell::text(&hero.name),
        Cell::text(&hero.color),
        Cell::integer(hero.power),
        Cell::integer(hero.hp),
        Cell::integer(hero.magic_penetration),
        Cell::integer(hero.armor_penetration),
        match &hero.favor_pet {
            Some(pet) => Cell::text(pet),
            None => Cell::empty().warning(),
        },
        Cell::integer(hero.favor_power),
    ]
}

fn pet_block(pet: Option<&PetDetail>) -> Vec<Cell> {
    match pet {
        Some(pet) => vec![
            Cell::text(&pet.name),
            Cell::text(&pet.color),
            Cell::integer(pet.power),
        ],
        None => vec![Cell::empty().warning(); 3],
    }
}

fn match_detail(matches: &[MatchDetailRow]) -> Sheet {
    let mut header: Vec<String> = [
        "Player ID",
        "Player",
        "Match ID",
        "Datetime",
        "Replay Link",
        "Boss Level at End of Fight",
        "Bosses Fought",
        "Total Damage to Boss",
        "Damage to Boss #1",
        "Damage to Boss #2",
        "Guild Morale",
        "Buffs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for slot in 1..=HERO_BLOCKS {
        header.extend(HERO_COLUMNS.iter().map(|column| format!("Hero {slot} {column}")));
    }
    header.extend(["Pet Name", "Pet Color", "Pet Power"].map(String::from));

    let mut sheet = Sheet::new(MATCH_DETAIL, header);
    for row in matches {
        let mut cells = vec![
            Cell::text(&row.player_id),
            player_cell(&row.player_id, row.player_name.as_deref()),
            Cell::text(&row.match_id),
            Cell::text(&row.start_time),
            Cell::text(&row.replay_link),
            Cell::integer(row.ending_level),
            Cell::integer(row.bosses_fought),
            Cell::integer(row.total_boss_damage),
            Cell::integer(row.progress[0]),
            Cell::integer(row.progress[1]),
            match row.morale {
                Some(points) => Cell::percent(points / 100.0),
                None => Cell::empty().warning(),
            },
            Cell::text(&row.buffs),
        ];
        for slot in 0..HERO_BLOCKS {
            cells.extend(hero_block(row.heroes.get(slot)));
        }
        cells.extend(pet_block(row.pet.as_ref()));
        sheet.push(cells);
    }
    sheet
}

fn optional_number(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::number(value),
        None => Cell::text(NO_DATA).warning(),
    }
}

fn hero_row(hero: &HeroEfficiency) -> Vec<Cell> {
    vec![
        Cell::text(&hero.name),
        Cell::integer(hero.count),
        optional_number(hero.average_power),
        optional_number(hero.average_team_damage),
        optional_number(hero.score),
    ]
}

fn hero_summary(report: &EventReport) -> Sheet {
    let mut sheet = Sheet::new(
        HERO_SUMMARY,
        [
            "Hero",
            "Count",
            "Average Power",
            "Average Team Damage",
            "Team Damage per Hero Power",
        ],
    );
    for hero in &report.heroes.ranked {
        sheet.push(hero_row(hero));
    }
    sheet.push(hero_row(&report.heroes.companion));
    sheet
}

fn purchase_cell(purchase: &BuffPurchase) -> Cell {
    let cell = Cell::text(purchase.display());
    if purchase.name.is_some() {
        cell
    } else {
        cell.warning()
    }
}

fn buff_summary(report: &EventReport, names: &HashMap<&str, Option<&str>>) -> Sheet {
    let widest = report
        .buffs
        .players
        .iter()
        .map(|player| player.purchases.len())
        .max()
        .unwrap_or(0);
    let mut header: Vec<String> = ["Player ID", "Player", "Match ID", "Total Gold"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend((1..=widest).map(|n| format!("Buff {n}")));

    let mut sheet = Sheet::new(BUFF_SUMMARY, header);
    for player in &report.buffs.players {
        let name = names.get(player.player_id.as_str()).copied().flatten();
        let mut cells = vec![
            Cell::text(&player.player_id),
            player_cell(&player.player_id, name),
            Cell::text(&player.match_id),
            Cell::integer(player.total_gold),
        ];
        cells.extend(player.purchases.iter().map(purchase_cell));
        cells.resize(4 + widest, Cell::empty());
        sheet.push(cells);
    }
    sheet
}

fn buff_frequency(report: &EventReport) -> Sheet {
    let buyers = report.buffs.players.len();
    let mut sheet = Sheet::new(BUFF_FREQUENCY, ["Buff", "Players", "Share"]);
    for entry in &report.buffs.frequency {
        let label = Cell::text(&entry.label);
        let share = if buyers == 0 {
            Cell::empty()
        } else {
            Cell::percent(entry.players as f64 / buyers as f64)
        };
        sheet.push(vec![
            if entry.resolved { label } else { label.warning() },
            Cell::integer(entry.players),
            share,
        ]);
    }
    sheet
}

fn tier_header(tiers: &[u32], suffix: &str) -> Vec<String> {
    let mut header = vec!["Player ID".to_string(), "Player".to_string()];
    header.extend(tiers.iter().map(|tier| format!("Level {tier}{suffix}")));
    header
}

fn tier_cells(tiers: &[u32], damage: &BTreeMap<u32, u64>) -> Vec<Cell> {
    tiers
        .iter()
        .map(|tier| match damage.get(tier) {
            Some(value) => Cell::integer(*value),
            None => Cell::empty(),
        })
        .collect()
}

fn tier_damage(rows: &[TierHistoryRow], tiers: &[u32]) -> Sheet {
    let mut header = tier_header(tiers, "");
    header.push("Total".to_string());
    let mut sheet = Sheet::new(TIER_DAMAGE, header);
    for row in rows {
        let mut cells = vec![
            Cell::text(&row.player_id),
            player_cell(&row.player_id, row.name.as_deref()),
        ];
        cells.extend(tier_cells(tiers, &row.current));
        cells.push(Cell::integer(row.current.values().sum::<u64>()));
        sheet.push(cells);
    }
    sheet
}

/// Personal bests per tier. A current-event figure above the archived best
/// is flagged with a warning so new records stand out.
fn historical_summary(rows: &[TierHistoryRow], tiers: &[u32]) -> Sheet {
    let mut sheet = Sheet::new(HISTORICAL_SUMMARY, tier_header(tiers, " Best"));
    for row in rows {
        let mut cells = vec![
            Cell::text(&row.player_id),
            player_cell(&row.player_id, row.name.as_deref()),
        ];
        match &row.best {
            Some(best) => {
                for tier in tiers {
                    let current = row.current.get(tier).copied().unwrap_or(0);
                    cells.push(match best.get(tier) {
                        Some(&archived) if current > archived => Cell::integer(archived).warning(),
                        Some(&archived) => Cell::integer(archived),
                        None => Cell::empty().warning(),
                    });
                }
            }
            None => cells.extend(tiers.iter().map(|_| Cell::empty().warning())),
        }
        sheet.push(cells);
    }
    sheet
}

pub fn build_workbook(report: &EventReport, config: &EngineConfig) -> Workbook {
    let tiers = config.distinct_tiers();
    let names: HashMap<&str, Option<&str>> = report
        .players
        .iter()
        .map(|row| (row.player_id.as_str(), row.name.as_deref()))
        .collect();

    Workbook {
        name: report.name.clone(),
        sheets: vec![
            player_summary(&report.players, config),
            match_detail(&report.matches),
            hero_summary(report),
            buff_summary(report, &names),
            buff_frequency(report),
            tier_damage(&report.tier_rows, &tiers),
            historical_summary(&report.tier_rows, &tiers),
        ],
    }
}
