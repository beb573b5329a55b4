use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::analysis::{analyze_event, rollup_archives, EventInputs};
use crate::config::{load_config, EngineConfig};
use crate::data::archive::load_archives;
use crate::data::buffs::BuffCatalog;
use crate::data::loader::{load_buff_catalog, load_event, load_hero_catalog, load_roster};
use crate::error::{AnalysisError, LoadError, ReportError};
use crate::report::{build_workbook, CsvSink, JsonSink, ReportSink};

const USAGE: &str = "usage: asgard <report|history|check-buffs>";
const REPORT_USAGE: &str = "usage: asgard report <event.json> <guild.json> <heroes.json> \
[--buffs FILE] [--archives PATTERN] [--config FILE] [--out DIR] [--json]";
const HISTORY_USAGE: &str = "usage: asgard history <PATTERN> [--config FILE]";
const CHECK_BUFFS_USAGE: &str = "usage: asgard check-buffs <buffs.yaml>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Report,
    History,
    CheckBuffs,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(&'static str),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("buff catalog has {0} unreachable entr(y/ies)")]
    ShadowedBuffs(usize),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("report") => Some(Command::Report),
        Some("history") => Some(Command::History),
        Some("check-buffs") => Some(Command::CheckBuffs),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let result = match parse_command(args) {
        Some(Command::Report) => handle_report(args),
        Some(Command::History) => handle_history(args),
        Some(Command::CheckBuffs) => handle_check_buffs(args),
        None => Err(CliError::Usage(USAGE)),
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            match &err {
                CliError::Usage(usage) => eprintln!("{usage}"),
                other => eprintln!("{}", describe(other)),
            }
            err.exit_code()
        }
    }
}

/// The error and its source chain on one line.
fn describe(err: &CliError) -> String {
    let mut message = format!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

/// Positional arguments and `--flag [value]` options after the command name.
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    buffs: Option<PathBuf>,
    archives: Option<String>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    json: bool,
}

fn parse_options(args: &[String], usage: &'static str) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        let mut value = || rest.next().cloned().ok_or(CliError::Usage(usage));
        match arg.as_str() {
            "--buffs" => options.buffs = Some(PathBuf::from(value()?)),
            "--archives" => options.archives = Some(value()?),
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--out" => options.out = Some(PathBuf::from(value()?)),
            "--json" => options.json = true,
            flag if flag.starts_with("--") => return Err(CliError::Usage(usage)),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

fn engine_config(options: &Options) -> Result<EngineConfig, CliError> {
    match &options.config {
        Some(path) => Ok(load_config(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn archive_label(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn handle_report(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args, REPORT_USAGE)?;
    let [event_path, roster_path, heroes_path] = options.positional.as_slice() else {
        return Err(CliError::Usage(REPORT_USAGE));
    };
    let config = engine_config(&options)?;

    let event = load_event(event_path)?;
    let roster = load_roster(roster_path)?;
    let heroes = load_hero_catalog(heroes_path)?;
    let buffs = match &options.buffs {
        Some(path) => load_buff_catalog(path)?,
        None => BuffCatalog::default(),
    };
    let archives: Vec<(String, _)> = match &options.archives {
        Some(pattern) => load_archives(pattern)?
            .into_iter()
            .map(|(path, dataset)| (archive_label(&path), dataset))
            .collect(),
        None => Vec::new(),
    };
    info!(archives = archives.len(), "inputs loaded");

    let report = analyze_event(
        &EventInputs {
            event: &event,
            roster: &roster,
            heroes: &heroes,
            buffs: &buffs,
            archives: &archives,
        },
        &config,
    )?;
    let workbook = build_workbook(&report, &config);

    let out = options.out.clone().unwrap_or_else(|| PathBuf::from("."));
    let written = if options.json {
        JsonSink::new(out).write(&workbook)?
    } else {
        CsvSink::new(out).write(&workbook)?
    };
    println!("report written: {}", written.display());
    Ok(())
}

fn handle_history(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args, HISTORY_USAGE)?;
    let [pattern] = options.positional.as_slice() else {
        return Err(CliError::Usage(HISTORY_USAGE));
    };
    let config = engine_config(&options)?;

    let archives = load_archives(pattern)?;
    let labels: Vec<String> = archives.iter().map(|(path, _)| archive_label(path)).collect();
    let rollup = rollup_archives(
        labels
            .iter()
            .zip(&archives)
            .map(|(label, (_, dataset))| (label.as_str(), dataset)),
        &config,
    )?;
    let payload = serde_json::to_string_pretty(&rollup).map_err(ReportError::from)?;
    println!("{payload}");
    Ok(())
}

fn handle_check_buffs(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args, CHECK_BUFFS_USAGE)?;
    let [path] = options.positional.as_slice() else {
        return Err(CliError::Usage(CHECK_BUFFS_USAGE));
    };

    let catalog = load_buff_catalog(path)?;
    let shadowed = catalog.shadowed_entries();
    if shadowed.is_empty() {
        println!("buff catalog ok: {} entries", catalog.buffs.len());
        return Ok(());
    }
    for entry in &shadowed {
        eprintln!(
            "- entry {} '{}' is shadowed by entry {} '{}'",
            entry.index, entry.key, entry.shadowed_by_index, entry.shadowed_by_key
        );
    }
    Err(CliError::ShadowedBuffs(shadowed.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn commands_parse_by_name() {
        assert_eq!(parse_command(&args(&["asgard", "report"])), Some(Command::Report));
        assert_eq!(parse_command(&args(&["asgard", "history"])), Some(Command::History));
        assert_eq!(parse_command(&args(&["asgard", "check-buffs"])), Some(Command::CheckBuffs));
        assert_eq!(parse_command(&args(&["asgard", "serve"])), None);
    }

    #[test]
    fn options_split_flags_from_positionals() {
        let options = parse_options(
            &args(&["asgard", "report", "e.json", "--json", "g.json", "--out", "dir", "h.json"]),
            REPORT_USAGE,
        )
        .expect("options");
        assert_eq!(options.positional, vec!["e.json", "g.json", "h.json"]);
        assert!(options.json);
        assert_eq!(options.out, Some(PathBuf::from("dir")));
    }

    #[test]
    fn flag_without_value_is_a_usage_error() {
        let err = parse_options(&args(&["asgard", "report", "--buffs"]), REPORT_USAGE)
            .expect_err("usage");
        assert_eq!(err.exit_code(), 2);
    }
}
