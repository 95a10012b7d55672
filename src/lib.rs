// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # page-mediator
//!
//! Network-backed pagination over a local durable cache.
//!
//! A paging mechanism (a UI pager, or the bundled [`paging::PagingDriver`])
//! only ever reads items from the local store. When it needs more than is
//! cached it calls [`mediator::MediationEngine::load`], which decides whether
//! and what to fetch from the remote listing and merges the result into the
//! store, keyed by the remote's opaque page cursors.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use page_mediator::config::PagingConfig;
//! use page_mediator::mediator::MediationEngine;
//! use page_mediator::paging::PagingDriver;
//! use page_mediator::remote::ListingFetcher;
//! use page_mediator::store::DuckDbDatabase;
//!
//! #[tokio::main]
//! async fn main() -> page_mediator::Result<()> {
//!     let config = page_mediator::config::MediatorConfig::from_file("mediator.yaml")?;
//!     let db = DuckDbDatabase::from_config(&config.store)?;
//!     let fetcher = ListingFetcher::new(config.remote.clone(), &config.http)?;
//!
//!     let engine = MediationEngine::new(db, fetcher, "rust");
//!     let mut pager = PagingDriver::new(engine, config.paging);
//!     pager.refresh().await?;
//!     while !pager.append().await?.end_of_pagination_reached().unwrap_or(true) {}
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                paging mechanism (PagingDriver)              │
//! │        load(direction, PagingState)   reads ItemStore       │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────┐
//! │                      MediationEngine                        │
//! └───────┬─────────────────────────────────────────┬───────────┘
//!         │ transaction                             │ outside any transaction
//! ┌───────┴────────────────────┐          ┌─────────┴───────────┐
//! │ ItemStore | RemoteKeyStore │          │   RemoteFetcher     │
//! │ Memory    | DuckDB         │          │ HTTP listing API    │
//! └────────────────────────────┘          └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// YAML configuration
pub mod config;

/// Paging state and a minimal paging mechanism
pub mod paging;

/// Transactional item and remote key storage
pub mod store;

/// Remote page fetching over HTTP
pub mod remote;

/// The remote mediation engine
pub mod mediator;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FetchError, Result};
pub use types::*;

pub use mediator::MediationEngine;
pub use paging::{Page, PagingDriver, PagingState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
