use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dynocurve_core::chart::{peak_summary, DisplayMode};
use dynocurve_core::config::{
    DatasetConfig, SessionConfig, DEFAULT_FIRST_LABEL, DEFAULT_SECOND_LABEL,
};
use dynocurve_core::pipeline::{compare_session, Comparison, DatasetSlot};
use dynocurve_core::smoothing::{Peak, SmoothedCurve};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Power and torque curves from road speed/RPM logs", long_about = None)]
struct Cli {
    /// Session file (JSON) with datasets, vehicles and display mode
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Log file of the first run (solid lines)
    #[arg(long, value_hint = ValueHint::FilePath)]
    first: Option<PathBuf>,

    /// Log file of the second run (dashed lines)
    #[arg(long, value_hint = ValueHint::FilePath)]
    second: Option<PathBuf>,

    /// Label of the first run
    #[arg(long)]
    label1: Option<String>,

    /// Label of the second run
    #[arg(long)]
    label2: Option<String>,

    /// Which runs to draw
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Chart image path (`.svg` for SVG, otherwise PNG)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Print a session file template and exit
    #[arg(long, action = ArgAction::SetTrue)]
    print_config: bool,

    /// Print peaks as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    First,
    Second,
    Both,
}

impl From<ModeArg> for DisplayMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::First => DisplayMode::First,
            ModeArg::Second => DisplayMode::Second,
            ModeArg::Both => DisplayMode::Both,
        }
    }
}

#[derive(Serialize, Debug)]
struct RunReport {
    slot: &'static str,
    label: String,
    points: usize,
    peak_power: Peak,
    peak_torque: Peak,
}

#[derive(Serialize, Debug)]
struct FailureReport {
    slot: &'static str,
    label: String,
    error: String,
}

#[derive(Serialize, Debug)]
struct Report {
    mode: DisplayMode,
    runs: Vec<RunReport>,
    failures: Vec<FailureReport>,
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if cli.print_config {
        let template = SessionConfig::template()
            .to_json()
            .context("failed to serialize session template")?;
        println!("{template}");
        return Ok(());
    }

    let session = build_session(&cli)?;
    info!(
        "Comparing {} run(s), mode {:?}",
        session.first.iter().chain(session.second.iter()).count(),
        session.mode
    );

    let comparison = compare_session(&session);
    for failure in &comparison.failures {
        eprintln!(
            "error: {} '{}': {}",
            failure.slot, failure.label, failure.error
        );
    }

    let report = build_report(&session, &comparison);
    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print_summary(&session, &comparison);
    }

    let chart = match (&comparison.chart, &comparison.empty) {
        (Some(chart), _) => chart,
        (None, Some(err)) => return Err(anyhow!("{err}")),
        (None, None) => return Err(anyhow!("no chart was produced")),
    };

    if let Some(output) = session.output.as_ref() {
        chart
            .export(output)
            .with_context(|| format!("failed to write chart to {}", output.display()))?;
    }
    Ok(())
}

/// Session file (if any) with command-line overrides applied
fn build_session(cli: &Cli) -> Result<SessionConfig> {
    let mut session = match cli.config.as_ref() {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session file {}", path.display()))?,
        None => SessionConfig::default(),
    };

    apply_dataset_override(
        &mut session.first,
        cli.first.as_ref(),
        cli.label1.as_ref(),
        DEFAULT_FIRST_LABEL,
    );
    apply_dataset_override(
        &mut session.second,
        cli.second.as_ref(),
        cli.label2.as_ref(),
        DEFAULT_SECOND_LABEL,
    );

    if let Some(mode) = cli.mode {
        session.mode = mode.into();
    }
    if let Some(output) = cli.output.as_ref() {
        session.output = Some(output.clone());
    }

    if session.first.is_none() && session.second.is_none() {
        return Err(anyhow!(
            "no datasets given; pass --first/--second or a --config session file"
        ));
    }
    Ok(session)
}

fn apply_dataset_override(
    dataset: &mut Option<DatasetConfig>,
    path: Option<&PathBuf>,
    label: Option<&String>,
    default_label: &str,
) {
    if let Some(path) = path {
        if let Some(existing) = dataset.as_mut() {
            existing.path = path.clone();
        } else {
            *dataset = Some(DatasetConfig::new(path.clone(), default_label));
        }
    }
    if let (Some(existing), Some(label)) = (dataset.as_mut(), label) {
        existing.label = if label.trim().is_empty() {
            default_label.to_string()
        } else {
            label.clone()
        };
    }
}

fn slot_name(slot: DatasetSlot) -> &'static str {
    match slot {
        DatasetSlot::First => "first",
        DatasetSlot::Second => "second",
    }
}

/// Runs that made it onto the chart, in draw order
fn drawn_runs<'a>(
    session: &'a SessionConfig,
    comparison: &'a Comparison,
) -> impl Iterator<Item = (DatasetSlot, &'a str, &'a SmoothedCurve)> + 'a {
    let mode = session.mode;
    [
        (DatasetSlot::First, session.first_label(), mode.shows_first()),
        (DatasetSlot::Second, session.second_label(), mode.shows_second()),
    ]
    .into_iter()
    .filter(|(_, _, shown)| *shown)
    .filter_map(move |(slot, label, _)| comparison.curve(slot).map(|curve| (slot, label, curve)))
}

fn build_report(session: &SessionConfig, comparison: &Comparison) -> Report {
    let runs = drawn_runs(session, comparison)
        .map(|(slot, label, curve)| RunReport {
            slot: slot_name(slot),
            label: label.to_string(),
            points: curve.len(),
            peak_power: curve.peak_power,
            peak_torque: curve.peak_torque,
        })
        .collect();

    let failures = comparison
        .failures
        .iter()
        .map(|f| FailureReport {
            slot: slot_name(f.slot),
            label: f.label.clone(),
            error: f.error.to_string(),
        })
        .collect();

    Report {
        mode: session.mode,
        runs,
        failures,
        output: session.output.clone(),
    }
}

fn print_summary(session: &SessionConfig, comparison: &Comparison) {
    for (_, label, curve) in drawn_runs(session, comparison) {
        for line in peak_summary(label, curve) {
            println!("{line}");
        }
        println!();
    }
}
