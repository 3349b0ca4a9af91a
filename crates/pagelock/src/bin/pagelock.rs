//! `pagelock` command-line interface: replay recorded sessions and inspect
//! the template table.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use pagelock::io::{replay, PagelockConfig, Session};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pagelock")]
#[command(about = "Locate a printed page from its QR marker")]
#[command(version)]
struct Cli {
    /// Log level for the stderr logger (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session through the tracker.
    Replay {
        /// Session JSON: source/preview sizes, rotation and decoder events.
        session: PathBuf,

        /// Configuration JSON (templates path, tracker parameters).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the report here instead of printing it to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the known page templates.
    Templates {
        /// Configuration JSON (templates path, tracker parameters).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Replay {
            session,
            config,
            output,
        } => run_replay(&session, config.as_deref(), output.as_deref()),
        Commands::Templates { config } => run_templates(config.as_deref()),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter) -> CliResult<()> {
    pagelock::core::init_with_level(level)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(_level: LevelFilter) -> CliResult<()> {
    pagelock::core::init_tracing(false);
    // the subscriber may already have installed the bridge
    let _ = tracing_log::LogTracer::init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<PagelockConfig> {
    match path {
        Some(path) => {
            log::info!("loading config {}", path.display());
            Ok(PagelockConfig::load_json(path)?)
        }
        None => Ok(PagelockConfig::default()),
    }
}

fn run_replay(session_path: &Path, config: Option<&Path>, output: Option<&Path>) -> CliResult<()> {
    let config = load_config(config)?;
    let mut tracker = config.build_tracker()?;
    let session = Session::load_json(session_path)?;
    log::info!(
        "session {}: {} frames",
        session_path.display(),
        session.frames.len()
    );

    let report = replay(&mut tracker, &session)?;

    match output {
        Some(path) => {
            report.write_json(path)?;
            let first = report
                .first_match
                .map_or_else(|| "none".to_string(), |i| i.to_string());
            println!(
                "matched {}/{} frames, first match: {}",
                report.matched, report.frames, first
            );
            log::info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_templates(config: Option<&Path>) -> CliResult<()> {
    let table = load_config(config)?.load_templates()?;
    for t in table.templates() {
        let e = t.extent();
        println!(
            "{}\t{} x {} units, offset ({}, {})",
            t.key, e.width_units, e.height_units, e.offset_x, e.offset_y
        );
    }
    Ok(())
}
