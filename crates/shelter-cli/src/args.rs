use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for shelter-cli
#[derive(Debug, Parser)]
#[command(
    name = "shelter-cli",
    version,
    about = "Find the nearest evacuation shelters that can handle a given hazard"
)]
pub struct CliArgs {
    /// Engine configuration JSON (sources, schemas, ranking, cache)
    #[arg(short = 'c', long = "config", global = true, conflicts_with = "data_dir")]
    pub config: Option<PathBuf>,

    /// Directory holding mergeFromCity_1.csv and matsu_hinan.csv (default: current directory)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG is honoured otherwise)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank the shelters nearest to a point
    Nearest {
        /// Query point as "lat,lon" (e.g. "33.8117,132.7789" or "(33.8117, 132.7789)")
        #[arg(allow_hyphen_values = true)]
        point: String,

        /// Hazard type: earthquake, tsunami, storm_surge, flood, landslide (or 地震, 津波, ...)
        #[arg(long = "hazard")]
        hazard: Option<String>,

        /// Required capability level for the hazard: full, partial, none, unknown
        #[arg(long = "level")]
        level: Option<String>,

        /// Number of shelters to list (default from configuration)
        #[arg(short = 'n', long = "top")]
        top: Option<usize>,

        /// Skip shelters reserved for people needing special care
        #[arg(long = "general-only")]
        general_only: bool,
    },

    /// Show a summary of the merged shelter snapshot
    Stats,

    /// Search shelters whose name contains a substring
    Search {
        /// Substring to search (case- and accent-insensitive)
        query: String,
    },

    /// Build the snapshot and report rows dropped during loading
    Validate,
}
