//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{
  check_quota, decode_value, encode_value, product_key, sort_products, RecordStore, StoreError,
  PRODUCT_PREFIX,
};
use crate::inventory::Product;

/// Record store that keeps raw key/value strings in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<BTreeMap<String, String>>,
  quota_bytes: Option<u64>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
    self.quota_bytes = quota_bytes;
    self
  }

  fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
    self
      .entries
      .lock()
      .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))
  }

  /// Write a raw entry, bypassing product encoding.
  #[cfg(test)]
  pub(crate) fn insert_raw(&self, key: &str, value: &str) {
    if let Ok(mut entries) = self.lock() {
      entries.insert(key.to_string(), value.to_string());
    }
  }

  #[cfg(test)]
  pub(crate) fn raw_len(&self) -> usize {
    self.lock().map(|e| e.len()).unwrap_or(0)
  }
}

impl RecordStore for MemoryStore {
  fn put(&self, product: &Product) -> Result<(), StoreError> {
    let key = product_key(&product.code);
    let value = encode_value(product)?;
    let mut entries = self.lock()?;

    if self.quota_bytes.is_some() {
      let used: u64 = entries
        .iter()
        .filter(|(k, _)| **k != key)
        .map(|(k, v)| (k.len() + v.len()) as u64)
        .sum();
      check_quota(used, (key.len() + value.len()) as u64, self.quota_bytes)?;
    }

    entries.insert(key, value);
    Ok(())
  }

  fn get(&self, code: &str) -> Result<Option<Product>, StoreError> {
    let key = product_key(code);
    Ok(
      self
        .lock()?
        .get(&key)
        .and_then(|value| decode_value(&key, value)),
    )
  }

  fn delete(&self, code: &str) -> Result<(), StoreError> {
    self.lock()?.remove(&product_key(code));
    Ok(())
  }

  fn list_all(&self) -> Result<Vec<Product>, StoreError> {
    let mut products: Vec<Product> = self
      .lock()?
      .iter()
      .filter(|(k, _)| k.starts_with(PRODUCT_PREFIX))
      .filter_map(|(k, v)| decode_value(k, v))
      .collect();
    sort_products(&mut products);
    Ok(products)
  }

  fn clear(&self) -> Result<usize, StoreError> {
    let mut entries = self.lock()?;
    let before = entries.len();
    entries.retain(|k, _| !k.starts_with(PRODUCT_PREFIX));
    Ok(before - entries.len())
  }
}
