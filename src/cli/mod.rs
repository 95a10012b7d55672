//! CLI module
//!
//! Command-line interface over a DuckDB cache and an HTTP listing API.
//!
//! # Commands
//!
//! - `refresh` - Replace a partition with the first remote page
//! - `append` - Fetch the next page after the cached items
//! - `sync` - Start the pager, then append up to N pages
//! - `show` - Print cached items (and keys)
//! - `validate` - Check the configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
