//! SQLite-backed record store.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{
  check_quota, decode_value, encode_value, product_key, sort_products, RecordStore, StoreError,
  PRODUCT_PREFIX,
};
use crate::inventory::Product;

/// Schema for the key-value table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Key-value store on a single SQLite database file.
pub struct SqliteStore {
  conn: Mutex<Connection>,
  quota_bytes: Option<u64>,
}

impl SqliteStore {
  /// Open or create the store at `path`, or at the default location.
  pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).map_err(|e| {
          StoreError::Backend(format!("failed to create store directory: {}", e))
        })?;
      }
    }

    let conn = Connection::open(&path).map_err(|e| {
      StoreError::Backend(format!(
        "failed to open store at {}: {}",
        path.display(),
        e
      ))
    })?;

    tracing::debug!(path = %path.display(), "opened inventory store");
    Self::with_connection(conn)
  }

  /// Open a throwaway store that lives only as long as this value.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, StoreError> {
    let store = Self {
      conn: Mutex::new(conn),
      quota_bytes: None,
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// Limit the total bytes of keys and values this store accepts.
  pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
    self.quota_bytes = quota_bytes;
    self
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| StoreError::Backend("could not determine data directory".to_string()))?;

    Ok(data_dir.join("stockr").join("inventory.db"))
  }

  fn run_migrations(&self) -> Result<(), StoreError> {
    self
      .lock()?
      .execute_batch(SCHEMA)
      .map_err(|e| StoreError::Backend(format!("failed to run migrations: {}", e)))
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self
      .conn
      .lock()
      .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))
  }

  /// Bytes used by every key except `excluding`, which is about to be replaced.
  fn used_bytes(conn: &Connection, excluding: &str) -> Result<u64, StoreError> {
    let used: i64 = conn.query_row(
      "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
       FROM kv_store WHERE key <> ?",
      params![excluding],
      |row| row.get(0),
    )?;
    Ok(used.max(0) as u64)
  }
}

impl RecordStore for SqliteStore {
  fn put(&self, product: &Product) -> Result<(), StoreError> {
    let key = product_key(&product.code);
    let value = encode_value(product)?;
    let conn = self.lock()?;

    if self.quota_bytes.is_some() {
      let used = Self::used_bytes(&conn, &key)?;
      check_quota(used, (key.len() + value.len()) as u64, self.quota_bytes)?;
    }

    conn.execute(
      "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;
    Ok(())
  }

  fn get(&self, code: &str) -> Result<Option<Product>, StoreError> {
    let key = product_key(code);
    let conn = self.lock()?;
    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM kv_store WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;

    Ok(value.and_then(|v| decode_value(&key, &v)))
  }

  fn delete(&self, code: &str) -> Result<(), StoreError> {
    self
      .lock()?
      .execute("DELETE FROM kv_store WHERE key = ?", params![product_key(code)])?;
    Ok(())
  }

  fn list_all(&self) -> Result<Vec<Product>, StoreError> {
    let conn = self.lock()?;
    let mut stmt =
      conn.prepare("SELECT key, value FROM kv_store WHERE substr(key, 1, ?) = ?")?;

    let rows: Vec<(String, String)> = stmt
      .query_map(params![PRODUCT_PREFIX.len(), PRODUCT_PREFIX], |row| {
        Ok((row.get(0)?, row.get(1)?))
      })?
      .collect::<Result<_, _>>()?;

    let mut products: Vec<Product> = rows
      .iter()
      .filter_map(|(key, value)| decode_value(key, value))
      .collect();
    sort_products(&mut products);
    Ok(products)
  }

  fn clear(&self) -> Result<usize, StoreError> {
    let removed = self.lock()?.execute(
      "DELETE FROM kv_store WHERE substr(key, 1, ?) = ?",
      params![PRODUCT_PREFIX.len(), PRODUCT_PREFIX],
    )?;
    Ok(removed)
  }
}
