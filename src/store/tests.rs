//! Tests for the storage layer
//!
//! Every contract test runs against both implementations.

use super::*;
use crate::error::Error;
use crate::types::{Item, RemoteKey};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn item(name: &str, partition: &str) -> Item {
    Item::new(name, partition).with_payload(json!({ "title": format!("post {name}") }))
}

fn key(name: &str, partition: &str, next: Option<&str>) -> RemoteKey {
    RemoteKey {
        name: name.to_string(),
        partition: partition.to_string(),
        previous_cursor: None,
        next_cursor: next.map(String::from),
    }
}

fn names<D: CacheDatabase>(db: &D, partition: &str) -> Vec<String> {
    db.transaction(|tx| tx.items().items_by_partition(partition, 0, 10_000))
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect()
}

// ============================================================================
// Contract checks
// ============================================================================

fn check_insert_preserves_order<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| {
        tx.items()
            .insert_all(&[item("a", "rust"), item("b", "rust"), item("x", "go")])?;
        tx.items().insert_all(&[item("c", "rust")])
    })
    .unwrap();

    assert_eq!(names(db, "rust"), vec!["a", "b", "c"]);
    assert_eq!(names(db, "go"), vec!["x"]);

    let page = db
        .transaction(|tx| tx.items().items_by_partition("rust", 1, 1))
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "b");
    assert_eq!(page[0].payload["title"], "post b");
}

fn check_insert_upserts_by_identity<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| tx.items().insert_all(&[item("a", "rust"), item("b", "rust")]))
        .unwrap();
    db.transaction(|tx| {
        tx.items().insert_all(&[
            Item::new("a", "rust").with_payload(json!({ "title": "edited" }))
        ])
    })
    .unwrap();

    let count = db
        .transaction(|tx| tx.items().count_by_partition("rust"))
        .unwrap();
    assert_eq!(count, 2);
    // re-inserted identity moves to the end
    assert_eq!(names(db, "rust"), vec!["b", "a"]);

    let items = db
        .transaction(|tx| tx.items().items_by_partition("rust", 0, 10))
        .unwrap();
    assert_eq!(items[1].payload["title"], "edited");
}

fn check_delete_by_partition<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| {
        tx.items().insert_all(&[item("a", "rust"), item("x", "go")])?;
        tx.remote_keys()
            .insert_all(&[key("a", "rust", Some("t1")), key("x", "go", Some("g1"))])
    })
    .unwrap();

    db.transaction(|tx| {
        tx.items().delete_by_partition("rust")?;
        tx.remote_keys().delete_by_partition("rust")
    })
    .unwrap();

    assert!(names(db, "rust").is_empty());
    assert_eq!(names(db, "go"), vec!["x"]);
    let (gone, kept) = db
        .transaction(|tx| {
            Ok((
                tx.remote_keys().key_for("a", "rust")?,
                tx.remote_keys().key_for("x", "go")?,
            ))
        })
        .unwrap();
    assert!(gone.is_none());
    assert_eq!(kept, Some(key("x", "go", Some("g1"))));
}

fn check_remote_key_replace<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| tx.remote_keys().insert_all(&[key("a", "rust", Some("t1"))]))
        .unwrap();
    db.transaction(|tx| tx.remote_keys().insert_all(&[key("a", "rust", None)]))
        .unwrap();

    let keys = db
        .transaction(|tx| tx.remote_keys().keys_by_partition("rust"))
        .unwrap();
    assert_eq!(keys, vec![key("a", "rust", None)]);

    let missing = db
        .transaction(|tx| tx.remote_keys().key_for("zzz", "rust"))
        .unwrap();
    assert!(missing.is_none());
}

fn check_rollback_on_error<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| tx.items().insert_all(&[item("a", "rust")]))
        .unwrap();

    let result: crate::Result<()> = db.transaction(|tx| {
        tx.items().delete_by_partition("rust")?;
        tx.items().insert_all(&[item("half", "rust")])?;
        Err(Error::storage("simulated abort"))
    });
    assert!(result.unwrap_err().is_storage());

    assert_eq!(names(db, "rust"), vec!["a"]);
}

fn check_refresh_same_identities<D: CacheDatabase>(db: &D) {
    db.transaction(|tx| {
        tx.items().insert_all(&[item("a", "rust"), item("b", "rust")])?;
        tx.remote_keys()
            .insert_all(&[key("a", "rust", Some("t1")), key("b", "rust", Some("t1"))])
    })
    .unwrap();

    db.transaction(|tx| {
        tx.items().delete_by_partition("rust")?;
        tx.remote_keys().delete_by_partition("rust")?;
        tx.remote_keys()
            .insert_all(&[key("b", "rust", Some("t9")), key("a", "rust", Some("t9"))])?;
        tx.items().insert_all(&[item("b", "rust"), item("a", "rust")])
    })
    .unwrap();

    assert_eq!(names(db, "rust"), vec!["b", "a"]);
    let keys = db
        .transaction(|tx| tx.remote_keys().keys_by_partition("rust"))
        .unwrap();
    assert_eq!(
        keys,
        vec![key("a", "rust", Some("t9")), key("b", "rust", Some("t9"))]
    );
}

// ============================================================================
// MemoryDatabase
// ============================================================================

#[test]
fn test_memory_insert_preserves_order() {
    check_insert_preserves_order(&MemoryDatabase::new());
}

#[test]
fn test_memory_upsert() {
    check_insert_upserts_by_identity(&MemoryDatabase::new());
}

#[test]
fn test_memory_delete_by_partition() {
    check_delete_by_partition(&MemoryDatabase::new());
}

#[test]
fn test_memory_remote_key_replace() {
    check_remote_key_replace(&MemoryDatabase::new());
}

#[test]
fn test_memory_rollback_on_error() {
    check_rollback_on_error(&MemoryDatabase::new());
}

#[test]
fn test_memory_refresh_same_identities() {
    check_refresh_same_identities(&MemoryDatabase::new());
}

#[test]
fn test_memory_commit_count() {
    let db = MemoryDatabase::new();
    assert_eq!(db.commit_count(), 0);

    db.transaction(|tx| tx.items().insert_all(&[item("a", "rust")]))
        .unwrap();
    let _: crate::Result<()> = db.transaction(|_| Err(Error::storage("abort")));

    assert_eq!(db.commit_count(), 1);
}

#[test]
fn test_memory_rollback_on_panic() {
    let db = MemoryDatabase::new();
    db.transaction(|tx| tx.items().insert_all(&[item("a", "rust")]))
        .unwrap();

    let shared = db.clone();
    let result = std::thread::spawn(move || {
        let _: crate::Result<()> = shared.transaction(|tx| {
            tx.items().delete_by_partition("rust")?;
            panic!("writer crashed mid-transaction");
        });
    })
    .join();
    assert!(result.is_err());

    let count = db
        .transaction(|tx| tx.items().count_by_partition("rust"))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(db.commit_count(), 1);
}

// ============================================================================
// DuckDbDatabase
// ============================================================================

#[test]
fn test_duckdb_insert_preserves_order() {
    check_insert_preserves_order(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_upsert() {
    check_insert_upserts_by_identity(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_delete_by_partition() {
    check_delete_by_partition(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_remote_key_replace() {
    check_remote_key_replace(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_rollback_on_error() {
    check_rollback_on_error(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_refresh_same_identities() {
    check_refresh_same_identities(&DuckDbDatabase::open_in_memory().unwrap());
}

#[test]
fn test_duckdb_file_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.duckdb");

    {
        let db = DuckDbDatabase::open(&path).unwrap();
        db.transaction(|tx| {
            tx.items().insert_all(&[item("a", "rust"), item("b", "rust")])?;
            tx.remote_keys().insert_all(&[key("b", "rust", Some("t2"))])
        })
        .unwrap();
    }

    let db = DuckDbDatabase::open(&path).unwrap();
    assert_eq!(db.location(), path.display().to_string());
    assert_eq!(names(&db, "rust"), vec!["a", "b"]);
    let stored = db
        .transaction(|tx| tx.remote_keys().key_for("b", "rust"))
        .unwrap();
    assert_eq!(stored, Some(key("b", "rust", Some("t2"))));
}
