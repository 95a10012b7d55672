//! DuckDB-backed cache database
//!
//! Tables carry no primary key: upsert is delete-then-insert by identity, so
//! a refresh can delete and re-insert the same identities inside one
//! transaction.

use super::types::{CacheDatabase, ItemStore, RemoteKeyStore, UnitOfWork};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::{Item, JsonValue, RemoteKey};
use duckdb::{params, Connection, Transaction};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items (
    name VARCHAR NOT NULL,
    partition_name VARCHAR NOT NULL,
    seq BIGINT NOT NULL,
    payload VARCHAR NOT NULL,
    fetched_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS remote_keys (
    name VARCHAR NOT NULL,
    partition_name VARCHAR NOT NULL,
    previous_cursor VARCHAR,
    next_cursor VARCHAR
);
";

/// Cache database stored in DuckDB
pub struct DuckDbDatabase {
    conn: Mutex<Connection>,
    /// Location (for logging)
    location: String,
}

impl DuckDbDatabase {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, ":memory:".to_string())
    }

    /// Open the database described by `config`
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        if config.is_in_memory() {
            Self::open_in_memory()
        } else {
            Self::open(&config.path)
        }
    }

    fn with_connection(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("Opened cache database at {}", location);
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// Where this database lives
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl std::fmt::Debug for DuckDbDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbDatabase")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl CacheDatabase for DuckDbDatabase {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| Error::storage("database connection lock poisoned"))?;

        // Dropping an uncommitted transaction rolls it back
        let mut tx = DuckDbTransaction {
            tx: conn.transaction()?,
        };
        let value = f(&mut tx)?;
        tx.tx.commit()?;
        Ok(value)
    }
}

struct DuckDbTransaction<'c> {
    tx: Transaction<'c>,
}

impl UnitOfWork for DuckDbTransaction<'_> {
    fn items(&mut self) -> &mut dyn ItemStore {
        self
    }

    fn remote_keys(&mut self) -> &mut dyn RemoteKeyStore {
        self
    }
}

impl ItemStore for DuckDbTransaction<'_> {
    fn insert_all(&mut self, items: &[Item]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut next_seq: i64 = self.tx.query_row(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM items",
            [],
            |row| row.get(0),
        )?;
        let fetched_at = chrono::Utc::now().to_rfc3339();

        let mut delete = self
            .tx
            .prepare("DELETE FROM items WHERE name = ? AND partition_name = ?")?;
        let mut insert = self.tx.prepare(
            "INSERT INTO items (name, partition_name, seq, payload, fetched_at) VALUES (?, ?, ?, ?, ?)",
        )?;

        for item in items {
            let payload = serde_json::to_string(&item.payload)?;
            delete.execute(params![item.name, item.partition])?;
            insert.execute(params![item.name, item.partition, next_seq, payload, fetched_at])?;
            next_seq += 1;
        }

        Ok(())
    }

    fn delete_by_partition(&mut self, partition: &str) -> Result<()> {
        self.tx.execute(
            "DELETE FROM items WHERE partition_name = ?",
            params![partition],
        )?;
        Ok(())
    }

    fn items_by_partition(
        &self,
        partition: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT name, partition_name, payload FROM items
             WHERE partition_name = ?
             ORDER BY seq
             LIMIT {limit} OFFSET {offset}"
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let rows = stmt
            .query_map(params![partition], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, partition, payload)| -> Result<Item> {
                let payload: JsonValue = serde_json::from_str(&payload)?;
                Ok(Item {
                    name,
                    partition,
                    payload,
                })
            })
            .collect()
    }

    fn count_by_partition(&self, partition: &str) -> Result<usize> {
        let count: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM items WHERE partition_name = ?",
            params![partition],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RemoteKeyStore for DuckDbTransaction<'_> {
    fn insert_all(&mut self, keys: &[RemoteKey]) -> Result<()> {
        let mut delete = self
            .tx
            .prepare("DELETE FROM remote_keys WHERE name = ? AND partition_name = ?")?;
        let mut insert = self.tx.prepare(
            "INSERT INTO remote_keys (name, partition_name, previous_cursor, next_cursor) VALUES (?, ?, ?, ?)",
        )?;

        for key in keys {
            delete.execute(params![key.name, key.partition])?;
            insert.execute(params![
                key.name,
                key.partition,
                key.previous_cursor,
                key.next_cursor
            ])?;
        }

        Ok(())
    }

    fn key_for(&self, name: &str, partition: &str) -> Result<Option<RemoteKey>> {
        let mut stmt = self.tx.prepare(
            "SELECT previous_cursor, next_cursor FROM remote_keys
             WHERE name = ? AND partition_name = ?
             LIMIT 1",
        )?;
        let mut rows = stmt
            .query_map(params![name, partition], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows.pop().map(|(previous_cursor, next_cursor)| RemoteKey {
            name: name.to_string(),
            partition: partition.to_string(),
            previous_cursor,
            next_cursor,
        }))
    }

    fn delete_by_partition(&mut self, partition: &str) -> Result<()> {
        self.tx.execute(
            "DELETE FROM remote_keys WHERE partition_name = ?",
            params![partition],
        )?;
        Ok(())
    }

    fn keys_by_partition(&self, partition: &str) -> Result<Vec<RemoteKey>> {
        let mut stmt = self.tx.prepare(
            "SELECT name, previous_cursor, next_cursor FROM remote_keys
             WHERE partition_name = ?
             ORDER BY name",
        )?;
        let keys = stmt
            .query_map(params![partition], |row| {
                Ok(RemoteKey {
                    name: row.get(0)?,
                    partition: partition.to_string(),
                    previous_cursor: row.get(1)?,
                    next_cursor: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
