use crate::store::StoreError;
use thiserror::Error;

/// Errors from reading an inventory file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
  #[error("file has no header row")]
  Empty,

  #[error("missing column(s): {}; expected headers like codigo,nombre,precio", .missing.join(", "))]
  Schema { missing: Vec<&'static str> },
}

/// Errors returned by inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
  #[error("invalid {field}: {reason}")]
  Validation {
    field: &'static str,
    reason: &'static str,
  },

  #[error(transparent)]
  Csv(#[from] CsvError),

  #[error("inventory is empty, nothing to export")]
  EmptyInventory,

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
