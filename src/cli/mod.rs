//! Command line interface for placegate.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::{LatLng, QueryType};

/// placegate - cached, rate-limited place lookups.
#[derive(Parser, Debug)]
#[command(name = "placegate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "placegate.toml")]
    pub config: PathBuf,

    /// Verbose mode.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration in the target directory.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Looks up places inside a bounding box.
    Lookup {
        /// Place category (restaurants, hotels, attractions).
        #[arg(
            short = 't',
            long = "type",
            default_value = "restaurants",
            value_parser = QueryType::from_str
        )]
        query_type: QueryType,

        /// Southwest corner as LAT,LNG.
        #[arg(long, allow_hyphen_values = true)]
        sw: LatLng,

        /// Northeast corner as LAT,LNG.
        #[arg(long, allow_hyphen_values = true)]
        ne: LatLng,

        /// Only show places rated at least this much.
        #[arg(long)]
        min_rating: Option<f64>,

        /// Print the raw places as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Shows cache and rate limit statistics.
    Stats {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Empties the cache.
    ClearCache,

    /// Restarts the rate limit window (testing only).
    ResetLimit,

    /// Shows version.
    Version,
}
