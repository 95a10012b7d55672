//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cached, cursor-paged listing mediator
#[derive(Parser, Debug)]
#[command(name = "page-mediator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Mediator configuration file (YAML)
    #[arg(short, long, global = true, default_value = "mediator.yaml")]
    pub config: PathBuf,

    /// Cache database path (overrides `store.path`, ":memory:" allowed)
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the cached partition with the first remote page
    Refresh {
        #[arg(short, long)]
        partition: String,
    },

    /// Fetch the page after the last cached item
    Append {
        #[arg(short, long)]
        partition: String,
    },

    /// Start the pager (refreshing per `refresh_on_start`), then append until
    /// exhausted or `--pages` appends were made
    Sync {
        #[arg(short, long)]
        partition: String,

        /// Maximum number of appends after starting
        #[arg(long, default_value = "5")]
        pages: usize,
    },

    /// Print cached items of a partition
    Show {
        #[arg(short, long)]
        partition: String,

        /// Also print the stored remote keys
        #[arg(long)]
        keys: bool,

        /// Maximum items to print
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
