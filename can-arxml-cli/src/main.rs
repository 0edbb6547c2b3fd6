//! ARXML dump CLI Application
//!
//! Command-line front end of the can-arxml library. It loads one or more
//! ARXML files (in parallel) and prints the resulting CAN databases:
//! - Text listing of buses, messages, signals and value tables
//! - JSON export of the complete database
//! - Frame id filtering and signal sorting (flags or config.toml)

use anyhow::{bail, Result};
use can_arxml::{parse_arxml_file, Database};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// ARXML dump - Inspect CAN databases described in AUTOSAR XML
#[derive(Parser, Debug)]
#[command(name = "arxml-dump")]
#[command(about = "Load AUTOSAR ARXML files and print their CAN database", long_about = None)]
#[command(version)]
struct Args {
    /// ARXML file(s) to load
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only keep messages with this frame id (can be repeated, 0x.. accepted)
    #[arg(long = "frame-id", value_name = "ID", value_parser = parse_frame_id)]
    frame_ids: Vec<u32>,

    /// Sort the signals of each message by start bit
    #[arg(long)]
    sort_signals: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// One successfully loaded input file
#[derive(Serialize)]
struct LoadedFile<'a> {
    file: &'a Path,
    database: &'a Database,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("ARXML dump v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using can-arxml library v{}", can_arxml::VERSION);

    let config = effective_config(&args)?;
    let loader = &config.loader;

    let results: Vec<(&PathBuf, can_arxml::Result<Database>)> = args
        .files
        .par_iter()
        .map(|path| (path, parse_arxml_file(path, loader)))
        .collect();

    let mut loaded = Vec::new();
    let mut failures = 0usize;
    for (path, result) in &results {
        match result {
            Ok(database) => loaded.push(LoadedFile {
                file: path.as_path(),
                database,
            }),
            Err(e) => {
                log::error!("Failed to load {:?}: {}", path, e);
                failures += 1;
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.output.format {
        OutputFormat::Text => {
            for file in &loaded {
                report::write_text(&mut out, file.file, file.database, config.output.show_choices)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &loaded)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if failures > 0 {
        bail!("{} of {} files failed to load", failures, results.len());
    }

    Ok(())
}

/// Configuration file (if any) with command-line overrides applied
fn effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(format) = args.format {
        config.output.format = format;
    }
    if !args.frame_ids.is_empty() {
        config.loader.message_filter = Some(args.frame_ids.clone());
    }
    if args.sort_signals {
        config.loader.sort_signals = true;
    }

    Ok(config)
}

fn parse_frame_id(text: &str) -> std::result::Result<u32, String> {
    can_arxml::numeric::parse_u32(text).map_err(|e| e.to_string())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
