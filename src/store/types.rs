//! Storage traits

use crate::error::Result;
use crate::types::{Item, RemoteKey};

/// Persisted items
pub trait ItemStore {
    /// Insert items, replacing any existing row with the same identity.
    /// Rows are appended to the end of their partition's order.
    fn insert_all(&mut self, items: &[Item]) -> Result<()>;

    /// Remove every item of `partition`
    fn delete_by_partition(&mut self, partition: &str) -> Result<()>;

    /// Items of `partition` in insertion order
    fn items_by_partition(&self, partition: &str, offset: usize, limit: usize)
        -> Result<Vec<Item>>;

    /// Number of items in `partition`
    fn count_by_partition(&self, partition: &str) -> Result<usize>;
}

/// Persisted cursors, one per cached item
pub trait RemoteKeyStore {
    /// Insert keys, replacing on `(name, partition)` conflict
    fn insert_all(&mut self, keys: &[RemoteKey]) -> Result<()>;

    /// Key stored for the item `(name, partition)`
    fn key_for(&self, name: &str, partition: &str) -> Result<Option<RemoteKey>>;

    /// Remove every key of `partition`
    fn delete_by_partition(&mut self, partition: &str) -> Result<()>;

    /// Keys of `partition`, sorted by name
    fn keys_by_partition(&self, partition: &str) -> Result<Vec<RemoteKey>>;
}

/// Both stores, scoped to one open transaction
pub trait UnitOfWork {
    /// Get the item store
    fn items(&mut self) -> &mut dyn ItemStore;

    /// Get the remote key store
    fn remote_keys(&mut self) -> &mut dyn RemoteKeyStore;
}

/// A transactional cache database
pub trait CacheDatabase: Send + Sync {
    /// Run `f` in a transaction. Commits iff `f` returns `Ok`.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>;
}
