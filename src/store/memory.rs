//! In-process cache database
//!
//! Each transaction works on a clone of the committed state and swaps it in
//! on success. A failed or panicking transaction leaves the committed state
//! untouched.

use super::types::{CacheDatabase, ItemStore, RemoteKeyStore, UnitOfWork};
use crate::error::Result;
use crate::types::{Item, RemoteKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Identity = (String, String);

#[derive(Debug, Clone, Default)]
struct MemoryState {
    items: BTreeMap<Identity, (u64, Item)>,
    keys: BTreeMap<Identity, RemoteKey>,
    next_seq: u64,
}

/// In-memory cache database
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
    commits: Arc<AtomicUsize>,
}

impl MemoryDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed transactions so far
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl CacheDatabase for MemoryDatabase {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        // The committed state is only ever swapped whole, so a poisoned lock
        // still guards a consistent value.
        let mut committed = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut tx = MemoryTransaction {
            state: committed.clone(),
        };
        let value = f(&mut tx)?;

        *committed = tx.state;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}

struct MemoryTransaction {
    state: MemoryState,
}

fn identity(name: &str, partition: &str) -> Identity {
    (name.to_string(), partition.to_string())
}

impl UnitOfWork for MemoryTransaction {
    fn items(&mut self) -> &mut dyn ItemStore {
        self
    }

    fn remote_keys(&mut self) -> &mut dyn RemoteKeyStore {
        self
    }
}

impl ItemStore for MemoryTransaction {
    fn insert_all(&mut self, items: &[Item]) -> Result<()> {
        for item in items {
            let seq = self.state.next_seq;
            self.state.next_seq += 1;
            self.state
                .items
                .insert(identity(&item.name, &item.partition), (seq, item.clone()));
        }
        Ok(())
    }

    fn delete_by_partition(&mut self, partition: &str) -> Result<()> {
        self.state.items.retain(|(_, p), _| p != partition);
        Ok(())
    }

    fn items_by_partition(
        &self,
        partition: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Item>> {
        let mut rows: Vec<&(u64, Item)> = self
            .state
            .items
            .iter()
            .filter(|((_, p), _)| p == partition)
            .map(|(_, row)| row)
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn count_by_partition(&self, partition: &str) -> Result<usize> {
        Ok(self
            .state
            .items
            .keys()
            .filter(|(_, p)| p == partition)
            .count())
    }
}

impl RemoteKeyStore for MemoryTransaction {
    fn insert_all(&mut self, keys: &[RemoteKey]) -> Result<()> {
        for key in keys {
            self.state
                .keys
                .insert(identity(&key.name, &key.partition), key.clone());
        }
        Ok(())
    }

    fn key_for(&self, name: &str, partition: &str) -> Result<Option<RemoteKey>> {
        Ok(self.state.keys.get(&identity(name, partition)).cloned())
    }

    fn delete_by_partition(&mut self, partition: &str) -> Result<()> {
        self.state.keys.retain(|(_, p), _| p != partition);
        Ok(())
    }

    fn keys_by_partition(&self, partition: &str) -> Result<Vec<RemoteKey>> {
        // BTreeMap order is (name, partition), so this is already sorted by name
        Ok(self
            .state
            .keys
            .iter()
            .filter(|((_, p), _)| p == partition)
            .map(|(_, key)| key.clone())
            .collect())
    }
}
