use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_asgard")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("asgard-cli-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir should be created");
    dir
}

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, value.to_string()).expect("fixture should be written");
}

fn boss_event(date: i64, damage: u64) -> serde_json::Value {
    let heroes: serde_json::Map<String, serde_json::Value> = (1..=5)
        .map(|id| (id.to_string(), json!({"id": id, "type": "hero", "power": 500, "color": 2, "hp": 40})))
        .collect();
    json!({
        "date": date,
        "results": [
            {"result": {"response": {"7": {"bossDamage": damage, "bossAttemptsSpent": 1, "nodesPoints": 0, "nodesAttemptsSpent": 0}}}},
            {"result": {"response": []}},
            {"result": {"response": {"7": {"901": {
                "startTime": date,
                "attackers": heroes,
                "effects": {"attackers": {"percentDamageBuff_any": 10}},
                "result": {"level": 65},
                "progress": [{"defenders": {"heroes": {"1": {"extra": {"damageTaken": 0, "damageTakenNextLevel": damage}}}}}]
            }}}}}
        ]
    })
}

fn write_inputs(dir: &Path) -> [PathBuf; 3] {
    let event = dir.join("event.json");
    let guild = dir.join("guild.json");
    let heroes = dir.join("heroes.json");
    write_json(&event, boss_event(1637585752, 1234));
    write_json(
        &guild,
        json!({"results": [{"result": {"response": {"clan": {"members": {"7": {"name": "Sif"}}}}}}]}),
    );
    write_json(
        &heroes,
        json!({"heroes": ["", "A", "B", "C", "D", "E"], "pets": ["Albus"]}),
    );
    [event, guild, heroes]
}

#[test]
fn missing_command_prints_usage() {
    let output = Command::new(bin()).output().expect("asgard should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: asgard"));
}

#[test]
fn report_command_requires_three_inputs() {
    let output = Command::new(bin())
        .args(["report", "event.json"])
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: asgard report"));
}

#[test]
fn report_command_writes_json_workbook() {
    let dir = unique_temp_dir("report");
    let [event, guild, heroes] = write_inputs(&dir);
    let out = dir.join("out");

    let output = Command::new(bin())
        .arg("report")
        .args([&event, &guild, &heroes])
        .arg("--out")
        .arg(&out)
        .arg("--json")
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("report written"));

    let written = out.join("Asgard-2021-11-22T12-55-52.json");
    let payload: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(written).expect("workbook")).expect("json");
    assert_eq!(payload["sheets"][0]["name"], "Player Summary");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn report_command_fails_on_unknown_hero() {
    let dir = unique_temp_dir("unknown-hero");
    let [event, guild, heroes] = write_inputs(&dir);
    write_json(&heroes, json!({"heroes": ["", "A"], "pets": []}));

    let output = Command::new(bin())
        .arg("report")
        .args([&event, &guild, &heroes])
        .arg("--out")
        .arg(dir.join("out"))
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hero id 2 is not in the hero catalog"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn history_command_emits_personal_bests() {
    let dir = unique_temp_dir("history");
    write_json(&dir.join("Asgard-a.json"), boss_event(1637585752, 400));
    write_json(&dir.join("Asgard-b.json"), boss_event(1638051586, 900));
    write_json(&dir.join("unrelated.json"), json!({}));
    let pattern = dir.join("Asgard-*.json");

    let output = Command::new(bin())
        .arg("history")
        .arg(&pattern)
        .output()
        .expect("history should run");

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("history json");
    assert_eq!(payload["best"]["7"]["65"], 900);
    assert_eq!(payload["archives"], json!(["Asgard-a", "Asgard-b"]));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn check_buffs_fails_on_shadowed_entries() {
    let dir = unique_temp_dir("buffs");
    let path = dir.join("buffs.yaml");
    fs::write(
        &path,
        "buffs:\n  - {key: heroBuff_, name: Hero Buff, gold: 40, tier_size: 10, match: prefix}\n  - {key: heroBuff_attack, name: Attack, gold: 40, tier_size: 10}\n",
    )
    .expect("fixture should be written");

    let output = Command::new(bin())
        .args(["check-buffs", path.to_string_lossy().as_ref()])
        .output()
        .expect("check-buffs should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is shadowed by entry 0 'heroBuff_'"));

    let _ = fs::remove_dir_all(dir);
}
