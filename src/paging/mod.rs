//! Paging mechanism side of the mediation protocol
//!
//! # Overview
//!
//! - `Page` / `PagingState` - what is currently loaded, passed into every `load`
//! - `PagingDriver` - a small pager that loads through the mediator and reads
//!   back exclusively from the local store

mod driver;
mod types;

pub use driver::PagingDriver;
pub use types::{Page, PagingState};
