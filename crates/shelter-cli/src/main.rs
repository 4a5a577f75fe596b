//! shelter-cli: command-line interface for shelter-core
//!
//! Loads the configured shelter sources (or the built-in Ehime profile from a
//! data directory), then answers one command:
//!
//! - Nearest shelters for an earthquake, requiring full capability
//!   $ shelter-cli --data-dir ./data nearest "33.8117,132.7789" --hazard earthquake --level full
//!
//! - Snapshot statistics
//!   $ shelter-cli --data-dir ./data stats
//!
//! - Name search
//!   $ shelter-cli --data-dir ./data search 小学校
//!
//! - Check the sources and list dropped rows
//!   $ shelter-cli --config shelters.json validate
//!
//! Logs go to stderr; stdout carries only results (text or `--json`).
mod args;

use crate::args::{CliArgs, Commands};
use clap::Parser;
use shelter_cli::{
    parse_hazard, parse_level, parse_point, render_issues, render_outcome, render_search,
    render_stats,
};
use shelter_core::{AcceptanceFilter, EngineConfig, ShelterEngine, ShelterQuery};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => {
            let dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            EngineConfig::ehime_profile(dir)
        }
    };
    let engine = ShelterEngine::new(config)?;

    match args.command {
        Commands::Nearest {
            point,
            hazard,
            level,
            top,
            general_only,
        } => {
            let (lat, lon) = parse_point(&point)?;
            let mut query = ShelterQuery::new(lat, lon);
            if let Some(h) = hazard.as_deref() {
                query = query.hazard(parse_hazard(h)?);
            }
            if let Some(l) = level.as_deref() {
                query = query.level(parse_level(l)?);
            }
            if let Some(n) = top {
                query = query.top_n(n);
            }
            if general_only {
                query = query.acceptance(AcceptanceFilter::ExcludeRestricted);
            }

            let outcome = engine.query(&query)?;
            if args.json {
                print_json(&outcome)?;
            } else {
                print!("{}", render_outcome(&outcome));
            }
        }

        Commands::Stats => {
            let stats = engine.stats()?;
            if args.json {
                print_json(&stats)?;
            } else {
                print!("{}", render_stats(&stats));
            }
        }

        Commands::Search { query } => {
            let hits = engine.find_by_name(&query)?;
            if args.json {
                print_json(&hits)?;
            } else {
                print!("{}", render_search(&query, &hits));
            }
        }

        Commands::Validate => {
            let db = engine.snapshot()?;
            if args.json {
                print_json(&db.issues())?;
            } else {
                print!("{}", render_issues(&db.stats(), db.issues()));
            }
        }
    }

    Ok(())
}
