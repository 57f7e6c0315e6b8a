//! Geofence CLI - Command-line interface
//!
//! Evaluates zone files against single fixes, recorded fix traces and a
//! simulated tracker loop. Events go to stdout; logs go to stderr.

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{check, demo, replay, zones};
use config::ZoneFile;
use error::CliError;

/// Log filter used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "geofence", version, about = "Geofence zone evaluation engine")]
struct Cli {
    /// Zone file (default: <config dir>/geofence/zones.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "geofence=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate the configured zones against a single fix
    Check(check::CheckArgs),
    /// Replay a recorded fix trace
    Replay(replay::ReplayArgs),
    /// Run the simulated tracker loop
    Demo(demo::DemoArgs),
    /// List the configured zones
    Zones,
}

/// Log filter from `--log-level`, then `RUST_LOG`, then the default.
///
/// An unparsable filter falls back to the default.
fn log_filter(log_level: Option<&str>) -> EnvFilter {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    };
    filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_logging(log_level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(log_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let zones = ZoneFile::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => check::run(&zones, args),
        Commands::Replay(args) => replay::run(&zones, args),
        Commands::Demo(args) => demo::run(&zones, args),
        Commands::Zones => zones::run(&zones),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    tracing::debug!(version = geofence::VERSION, "Geofence CLI starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
