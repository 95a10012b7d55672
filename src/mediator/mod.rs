//! Remote mediation
//!
//! `MediationEngine::load` resolves a cursor for the requested direction,
//! fetches one page outside any transaction, then writes keys and items in a
//! single transaction:
//!
//! ```text
//! Prepend ─► Success(end = true), no I/O
//! Refresh ─► fetch(after = None, initial_load_size) ─► replace partition
//! Append  ─► key_for(last item).next_cursor
//!              ├─ none ─► Success(end = true), no fetch
//!              └─ some ─► fetch(after = cursor, page_size) ─► insert
//! ```

mod engine;

pub use engine::MediationEngine;
