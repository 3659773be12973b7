//! Loop budget timer demo.
//!
//! Runs one loop iteration of a TOML scenario (`looptimer.toml`) on the OS
//! clock, with worker threads raising each step's event, and prints how long
//! every step took against the shared loop budget.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use looptimer::exit_codes;
use looptimer::io::config::{DEFAULT_CONFIG_PATH, ScenarioConfig, load_config, write_config};
use looptimer::logging;
use looptimer::scenario::{LoopStop, ScenarioReport, StepReport, run_system_scenario};

#[derive(Parser)]
#[command(
    name = "looptimer",
    version,
    about = "Nested deadline budgets for polling loops"
)]
struct Cli {
    /// Scenario file to read or write.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default scenario if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Load and validate the scenario.
    Check,
    /// Run one loop iteration of the scenario and report each step.
    Run {
        /// Print the report as JSON instead of one line per step.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.path, force),
        Command::Check => cmd_check(&cli.path),
        Command::Run { json } => cmd_run(&cli.path, json),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &ScenarioConfig::default())?;
    println!("init: wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_check(path: &Path) -> Result<i32> {
    let cfg = load_config(path)?;
    println!(
        "check: loop_budget_ms={} steps={}",
        cfg.loop_budget_ms,
        cfg.steps.len()
    );
    Ok(exit_codes::OK)
}

fn cmd_run(path: &Path, json: bool) -> Result<i32> {
    let cfg = load_config(path)?;
    let report = if json {
        let report = run_system_scenario(&cfg, |_| {})?;
        let payload = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{payload}");
        report
    } else {
        let report = run_system_scenario(&cfg, print_step)?;
        print_summary(&report);
        report
    };
    Ok(report.exit_code())
}

fn print_step(step: &StepReport) {
    println!(
        "step: id={} strategy={} expected_ms={} elapsed_ms={} outcome={}",
        step.id,
        step.strategy.as_str(),
        step.expected_duration_ms,
        step.elapsed_ms,
        step.outcome
    );
}

fn print_summary(report: &ScenarioReport) {
    let stop = match &report.stop {
        LoopStop::Completed => "completed".to_string(),
        LoopStop::Abandoned { at_step, skipped } => {
            format!("abandoned at={} skipped={}", at_step, skipped.join(","))
        }
    };
    println!(
        "loop: total_elapsed_ms={} budget_ms={} stop={}",
        report.total_elapsed_ms, report.loop_budget_ms, stop
    );
}
