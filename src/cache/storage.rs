//! Catalog store implementations: SQLite and no-op.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::traits::{CachedCatalog, CatalogStore};
use crate::error::Error;
use crate::upstream::Catalog;

/// Name of the one slot the gallery uses
pub const CATALOG_SLOT: &str = "ml_models_cache";

/// Store that doesn't cache anything.
/// Used when caching is disabled - every session behaves like a first visit.
pub struct NoopStorage;

impl CatalogStore for NoopStorage {
  fn read(&self) -> Result<Option<CachedCatalog>, Error> {
    Ok(None) // Always miss
  }

  fn write(&self, _catalog: &Catalog) -> Result<(), Error> {
    Ok(()) // Discard
  }
}

/// SQLite-based key/value slot storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
  slot: String,
}

/// Schema for the slot table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_slots (
    slot TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    digest TEXT NOT NULL,
    cached_at TEXT NOT NULL
);
"#;

impl SqliteStorage {
  /// Open (or create) the database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// In-memory database, gone when dropped.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
      slot: CATALOG_SLOT.to_string(),
    })
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
    self
      .conn
      .lock()
      .map_err(|e| Error::StorageUnavailable(format!("lock poisoned: {}", e)))
  }

  /// Store raw text in the slot, bypassing serialization.
  #[cfg(test)]
  fn write_raw(&self, payload: &str) -> Result<(), Error> {
    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO catalog_slots (slot, payload, digest, cached_at)
       VALUES (?, ?, '', ?)",
      params![self.slot, payload, Utc::now().to_rfc3339()],
    )?;
    Ok(())
  }
}

impl CatalogStore for SqliteStorage {
  fn read(&self) -> Result<Option<CachedCatalog>, Error> {
    let conn = self.lock()?;

    let row: Option<(String, String, String)> = conn
      .query_row(
        "SELECT payload, digest, cached_at FROM catalog_slots WHERE slot = ?",
        params![self.slot],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()?;

    let (payload, digest, cached_at) = match row {
      Some(row) => row,
      None => return Ok(None),
    };

    let catalog = Catalog::from_json(&payload)
      .map_err(|e| Error::StorageUnavailable(format!("corrupt cached catalog: {}", e)))?;
    let cached_at = parse_datetime(&cached_at)?;

    Ok(Some(CachedCatalog {
      catalog,
      cached_at,
      digest,
    }))
  }

  fn write(&self, catalog: &Catalog) -> Result<(), Error> {
    let payload = catalog
      .to_json()
      .map_err(|e| Error::StorageUnavailable(format!("failed to serialize catalog: {}", e)))?;
    let digest = catalog.digest();

    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO catalog_slots (slot, payload, digest, cached_at)
       VALUES (?, ?, ?, ?)",
      params![self.slot, payload, digest, Utc::now().to_rfc3339()],
    )?;

    tracing::debug!(slot = %self.slot, %digest, records = catalog.len(), "catalog cached");
    Ok(())
  }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, Error> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::StorageUnavailable(format!("bad cached_at '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn slot_count(storage: &SqliteStorage) -> i64 {
    let conn = storage.conn.lock().unwrap();
    conn
      .query_row("SELECT COUNT(*) FROM catalog_slots", [], |row| row.get(0))
      .unwrap()
  }

  #[test]
  fn test_empty_store_reads_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.read().unwrap().is_none());
  }

  #[test]
  fn test_write_then_read() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    let catalog = Catalog::new(vec![json!({"id": 1, "title": "Heart"})]);

    storage.write(&catalog).unwrap();
    let cached = storage.read().unwrap().unwrap();

    assert!(cached.catalog.same_as(&catalog));
    assert_eq!(cached.digest, catalog.digest());
  }

  #[test]
  fn test_write_replaces_the_single_slot() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .write(&Catalog::new(vec![json!({"id": 1})]))
      .unwrap();
    storage
      .write(&Catalog::new(vec![json!({"id": 2}), json!({"id": 3})]))
      .unwrap();

    assert_eq!(slot_count(&storage), 1);
    let cached = storage.read().unwrap().unwrap();
    assert_eq!(cached.catalog.len(), 2);
  }

  #[test]
  fn test_corrupt_payload_is_storage_unavailable() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.write_raw("{ not an array").unwrap();

    let err = storage.read().unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
  }

  #[test]
  fn test_file_backed_store_persists_across_opens() {
    let dir = std::env::temp_dir().join(format!("ml-gallery-test-{}", std::process::id()));
    let path = dir.join("nested").join("cache.db");
    let catalog = Catalog::new(vec![json!({"id": 7})]);

    SqliteStorage::open(&path).unwrap().write(&catalog).unwrap();
    let cached = SqliteStorage::open(&path).unwrap().read().unwrap().unwrap();
    assert!(cached.catalog.same_as(&catalog));

    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_noop_storage_never_hits() {
    let storage = NoopStorage;
    storage.write(&Catalog::new(vec![json!({"id": 1})])).unwrap();
    assert!(storage.read().unwrap().is_none());
  }
}
