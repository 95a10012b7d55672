//! Local cache storage
//!
//! The paging mechanism only ever reads from here. Two leaf stores share one
//! transaction:
//! - [`ItemStore`] - fetched items, ordered per partition by insertion
//! - [`RemoteKeyStore`] - the cursor pair to continue from each item
//!
//! All access goes through [`CacheDatabase::transaction`], which commits when
//! the closure returns `Ok` and rolls back otherwise (including unwinding).
//!
//! Implementations:
//! - [`MemoryDatabase`] - in-process, copy-on-commit
//! - [`DuckDbDatabase`] - DuckDB file or in-memory database

mod duck;
mod memory;
mod types;

pub use duck::DuckDbDatabase;
pub use memory::MemoryDatabase;
pub use types::{CacheDatabase, ItemStore, RemoteKeyStore, UnitOfWork};

#[cfg(test)]
mod tests;
