//! # Trap Runner Binary
//!
//! Runs the units of work listed in a TOML file, each under its own
//! fatal-error checkpoint, and reports which of them failed.
//!
//! # Usage
//!
//! ```bash
//! # Mode from the [trap] section (or the build default)
//! trap_runner --config trap_runner/config/runner.toml
//!
//! # Override the mode
//! trap_runner --config runner.toml --mode checkpoint-resume
//!
//! # Verbose, JSON logs
//! trap_runner --config runner.toml -v --json
//! ```
//!
//! Exit status is 1 if any unit failed or the configuration was rejected.
//! In abort mode the first failing unit terminates the process.

#![deny(warnings)]

use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use trap_common::consts::DEFAULT_CONFIG_PATH;
use trap_common::mode::Mode;
use trap_runner::error::RunnerResult;
use trap_runner::{RunSummary, RunnerConfig, UnitStatus, run_units};

/// Trap Runner - units of work under fatal-error checkpoints
#[derive(Parser, Debug)]
#[command(name = "trap_runner")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Runs configured units of work, each under its own fatal-error checkpoint")]
#[command(long_about = None)]
struct Args {
    /// Path to the runner configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Fatal-error mode (abort, checkpoint-resume, exception). Overrides [trap].mode.
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match run(&args) {
        Ok(summary) if summary.failed() > 0 => {
            error!("{} of {} units failed", summary.failed(), summary.reports.len());
            std::process::exit(1);
        }
        Ok(_) => Ok(()),
        Err(e) => {
            error!("trap_runner failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> RunnerResult<RunSummary> {
    let config = match RunnerConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(args, Level::INFO);
            error!("cannot load {}", args.config.display());
            return Err(e.into());
        }
    };

    setup_tracing(args, config.shared.log_level.into());
    info!(
        "{} v{} starting ({} units)",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.units.len()
    );

    let requested = args.mode.or(config.trap.mode);
    let mode = match requested {
        Some(mode) => trap_core::mode::install(mode)?,
        None => trap_core::mode::active(),
    };
    info!("fatal-error mode: {}", mode);

    let summary = run_units(&config.units);

    info!("📋 Unit Summary:");
    for report in &summary.reports {
        match &report.status {
            UnitStatus::Completed { levels } => {
                info!("  - {}: completed ({} levels)", report.name, levels)
            }
            UnitStatus::Recovered { level, message } => {
                info!("  - {}: recovered at level {}: {}", report.name, level, message)
            }
            UnitStatus::Failed { message } => info!("  - {}: FAILED: {}", report.name, message),
        }
    }
    info!(
        "{} completed, {} recovered, {} failed",
        summary.reports.len() - summary.failed() - summary.recovered(),
        summary.recovered(),
        summary.failed()
    );

    Ok(summary)
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose { Level::DEBUG } else { configured };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }
}
