//! Key-value persistence for product records.
//!
//! Products live under `product:<code>` keys with a JSON value. Backends:
//! - `SqliteStore`: durable per-user store on disk
//! - `MemoryStore`: in-process map, used by tests and `--db :memory:`
//!
//! Both backends can enforce a byte quota over all stored keys and values.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::inventory::Product;
use std::cmp::Ordering;
use thiserror::Error;

/// Prefix shared by every product key.
pub const PRODUCT_PREFIX: &str = "product:";

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage quota exceeded ({used} of {quota} bytes used, write needs {needed})")]
  QuotaExceeded { used: u64, needed: u64, quota: u64 },

  #[error("failed to encode product {code}: {source}")]
  Serialize {
    code: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("storage backend error: {0}")]
  Backend(String),
}

impl From<rusqlite::Error> for StoreError {
  fn from(e: rusqlite::Error) -> Self {
    StoreError::Backend(e.to_string())
  }
}

/// Synchronous record store keyed by product code.
///
/// Writes are last-write-wins on a single key; there are no transactions
/// across records.
pub trait RecordStore: Send + Sync {
  /// Write or overwrite the product stored under its code.
  fn put(&self, product: &Product) -> Result<(), StoreError>;

  /// Look up a product by code.
  fn get(&self, code: &str) -> Result<Option<Product>, StoreError>;

  /// Remove a product. Removing a missing code is a no-op.
  fn delete(&self, code: &str) -> Result<(), StoreError>;

  /// Every stored product, sorted by code.
  fn list_all(&self) -> Result<Vec<Product>, StoreError>;

  /// Remove every product key, returning how many were removed.
  fn clear(&self) -> Result<usize, StoreError>;

  /// Number of readable products, the same ones `list_all` returns.
  fn count(&self) -> Result<usize, StoreError> {
    Ok(self.list_all()?.len())
  }
}

/// Storage key for a product code.
pub fn product_key(code: &str) -> String {
  format!("{}{}", PRODUCT_PREFIX, code)
}

/// Serialize a product into its stored JSON value.
pub(crate) fn encode_value(product: &Product) -> Result<String, StoreError> {
  serde_json::to_string(product).map_err(|source| StoreError::Serialize {
    code: product.code.clone(),
    source,
  })
}

/// Decode a stored value, logging and skipping anything unreadable.
pub(crate) fn decode_value(key: &str, value: &str) -> Option<Product> {
  match serde_json::from_str(value) {
    Ok(product) => Some(product),
    Err(e) => {
      tracing::warn!(key, error = %e, "skipping undecodable product record");
      None
    }
  }
}

/// Order codes the way a person reading the list expects: case folded
/// first, raw text as the tiebreak so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}

pub(crate) fn sort_products(products: &mut [Product]) {
  products.sort_by(|a, b| locale_cmp(&a.code, &b.code));
}

/// Check a pending write against an optional quota.
pub(crate) fn check_quota(used: u64, needed: u64, quota: Option<u64>) -> Result<(), StoreError> {
  match quota {
    Some(quota) if used + needed > quota => Err(StoreError::QuotaExceeded {
      used,
      needed,
      quota,
    }),
    _ => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_product_key() {
    assert_eq!(product_key("A1"), "product:A1");
  }

  #[test]
  fn test_locale_cmp_ignores_case_first() {
    assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
    assert_eq!(locale_cmp("B2", "b1"), Ordering::Greater);
    assert_ne!(locale_cmp("a", "A"), Ordering::Equal);
  }

  #[test]
  fn test_check_quota() {
    assert!(check_quota(10, 5, None).is_ok());
    assert!(check_quota(10, 5, Some(15)).is_ok());
    assert!(matches!(
      check_quota(10, 6, Some(15)),
      Err(StoreError::QuotaExceeded { quota: 15, .. })
    ));
  }

  #[test]
  fn test_decode_value_skips_garbage() {
    assert!(decode_value("product:x", "{not json").is_none());
    let p = decode_value("product:x", r#"{"code":"x","name":"X","price":1.5}"#).unwrap();
    assert_eq!(p.price, 1.5);
  }
}
