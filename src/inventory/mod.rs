//! Inventory operations on top of a record store.

pub mod codec;
mod error;
mod product;

pub use codec::{RejectReason, RowRejection};
pub use error::{CsvError, InventoryError};
pub use product::{parse_price_strict, Product, ProductForm};

use crate::store::RecordStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of replacing the inventory from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
  pub imported: usize,
  pub errors: usize,
  pub rejected: Vec<RowRejection>,
}

/// Inventory service. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Inventory {
  store: Arc<dyn RecordStore>,
}

impl Inventory {
  pub fn new(store: Arc<dyn RecordStore>) -> Self {
    Self { store }
  }

  /// Products whose code or name contains `query`, ignoring case.
  ///
  /// A blank query yields nothing rather than everything.
  pub fn search(&self, query: &str) -> Result<Vec<Product>, InventoryError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return Ok(Vec::new());
    }
    Ok(
      self
        .store
        .list_all()?
        .into_iter()
        .filter(|p| p.matches(&needle))
        .collect(),
    )
  }

  /// Validate a form and store the product, overwriting any existing code.
  pub fn register(&self, form: &ProductForm) -> Result<Product, InventoryError> {
    let code = form.code.trim();
    if code.is_empty() {
      return Err(InventoryError::Validation {
        field: "code",
        reason: "must not be empty",
      });
    }
    let name = form.name.trim();
    if name.is_empty() {
      return Err(InventoryError::Validation {
        field: "name",
        reason: "must not be empty",
      });
    }
    let price = parse_price_strict(&form.price).ok_or(InventoryError::Validation {
      field: "price",
      reason: "must be a number",
    })?;

    let product = Product::new(code, name, price);
    self.store.put(&product)?;
    info!(code = %product.code, price = product.price, "registered product");
    Ok(product)
  }

  pub fn get(&self, code: &str) -> Result<Option<Product>, InventoryError> {
    Ok(self.store.get(code)?)
  }

  pub fn delete(&self, code: &str) -> Result<(), InventoryError> {
    self.store.delete(code)?;
    info!(code, "deleted product");
    Ok(())
  }

  /// Replace the whole inventory with the contents of a file.
  ///
  /// The header is checked before anything is removed, so a file with the
  /// wrong columns leaves the inventory as it was. Rows that fail to parse
  /// or to store are counted and skipped.
  pub fn import_replacing_all(&self, text: &str) -> Result<ImportSummary, InventoryError> {
    let decoded = codec::decode(text)?;

    let removed = self.store.clear()?;
    info!(removed, "cleared inventory for import");

    let mut summary = ImportSummary {
      rejected: decoded.rejected,
      ..Default::default()
    };
    for (line, product) in &decoded.products {
      match self.store.put(product) {
        Ok(()) => summary.imported += 1,
        Err(e) => {
          warn!(line, code = %product.code, error = %e, "failed to store imported row");
          summary.rejected.push(RowRejection {
            line: *line,
            reason: RejectReason::Storage(e.to_string()),
          });
        }
      }
    }
    summary.rejected.sort_by_key(|r| r.line);
    summary.errors = summary.rejected.len();

    info!(
      imported = summary.imported,
      errors = summary.errors,
      "import finished"
    );
    Ok(summary)
  }

  /// Encode every product as an export file.
  pub fn export_all(&self) -> Result<String, InventoryError> {
    let products = self.store.list_all()?;
    let out = codec::encode(&products)?;
    info!(count = products.len(), "exported inventory");
    Ok(out)
  }

  /// Remove every product, returning how many were removed.
  pub fn clear_all(&self) -> Result<usize, InventoryError> {
    let removed = self.store.clear()?;
    info!(removed, "cleared inventory");
    Ok(removed)
  }

  pub fn list_all(&self) -> Result<Vec<Product>, InventoryError> {
    Ok(self.store.list_all()?)
  }

  pub fn count(&self) -> Result<usize, InventoryError> {
    Ok(self.store.count()?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{MemoryStore, SqliteStore};

  fn inventory() -> Inventory {
    Inventory::new(Arc::new(MemoryStore::new()))
  }

  fn form(code: &str, name: &str, price: &str) -> ProductForm {
    ProductForm::new(code, name, price)
  }

  #[test]
  fn test_register_latest_write_wins() {
    let inv = inventory();
    inv.register(&form("A", "One", "1")).unwrap();
    inv.register(&form("B", "Two", "2")).unwrap();
    inv.register(&form("A", "Uno", "1.5")).unwrap();

    let all = inv.list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], Product::new("A", "Uno", 1.5));
  }

  #[test]
  fn test_register_validation_writes_nothing() {
    let inv = inventory();
    for (f, field) in [
      (form("", "Name", "1"), "code"),
      (form("   ", "Name", "1"), "code"),
      (form("C", "", "1"), "name"),
      (form("C", "Name", ""), "price"),
      (form("C", "Name", "abc"), "price"),
    ] {
      match inv.register(&f) {
        Err(InventoryError::Validation { field: got, .. }) => assert_eq!(got, field),
        other => panic!("expected validation error, got {:?}", other),
      }
    }
    assert_eq!(inv.count().unwrap(), 0);
  }

  #[test]
  fn test_register_then_search_case_insensitive() {
    let inv = inventory();
    inv.register(&form("X1", "Gadget", "5")).unwrap();

    let found = inv.search("x1").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "X1");
    assert_eq!(found[0].price, 5.0);

    assert_eq!(inv.search("GADG").unwrap().len(), 1);
    assert!(inv.search("nothing").unwrap().is_empty());
  }

  #[test]
  fn test_blank_search_is_empty() {
    let inv = inventory();
    inv.register(&form("X1", "Gadget", "5")).unwrap();
    assert!(inv.search("").unwrap().is_empty());
    assert!(inv.search("   ").unwrap().is_empty());
  }

  #[test]
  fn test_search_keeps_code_order() {
    let inv = inventory();
    for code in ["b-bolt", "a-bolt", "c-nut"] {
      inv.register(&form(code, "part", "1")).unwrap();
    }
    let codes: Vec<String> = inv.search("bolt").unwrap().into_iter().map(|p| p.code).collect();
    assert_eq!(codes, vec!["a-bolt", "b-bolt"]);
  }

  #[test]
  fn test_export_empty_inventory() {
    let inv = inventory();
    assert!(matches!(
      inv.export_all(),
      Err(InventoryError::EmptyInventory)
    ));
  }

  #[test]
  fn test_import_counts_and_replaces() {
    let inv = inventory();
    inv.register(&form("OLD", "Stale", "1")).unwrap();

    let summary = inv
      .import_replacing_all("codigo,nombre,precio\nA1,Widget,9.99\n,Bad,abc\n")
      .unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.errors, 1);

    let all = inv.list_all().unwrap();
    assert_eq!(all, vec![Product::new("A1", "Widget", 9.99)]);
  }

  #[test]
  fn test_import_duplicate_codes_last_wins() {
    let inv = inventory();
    let summary = inv
      .import_replacing_all("code,name,price\nA,First,1\nA,Second,2\n")
      .unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(inv.get("A").unwrap().unwrap().name, "Second");
    assert_eq!(inv.count().unwrap(), 1);
  }

  #[test]
  fn test_import_schema_error_keeps_existing_inventory() {
    let inv = inventory();
    inv.register(&form("KEEP", "Kept", "1")).unwrap();

    let err = inv
      .import_replacing_all("sku,descripcion\nA,b\n")
      .unwrap_err();
    assert!(matches!(
      err,
      InventoryError::Csv(CsvError::Schema { .. })
    ));
    assert_eq!(inv.count().unwrap(), 1);
  }

  #[test]
  fn test_import_quota_failures_are_row_errors() {
    let inv = Inventory::new(Arc::new(MemoryStore::new().with_quota(Some(100))));
    let summary = inv
      .import_replacing_all(
        "codigo,nombre,precio\nA,Alpha,1\nB,Bravo,2\nC,Charlie,3\nD,Delta,4\n",
      )
      .unwrap();
    assert!(summary.imported >= 1);
    assert!(summary.errors >= 1);
    assert_eq!(summary.imported + summary.errors, 4);
    assert_eq!(inv.count().unwrap(), summary.imported);
    assert!(summary
      .rejected
      .iter()
      .all(|r| matches!(r.reason, RejectReason::Storage(_))));
  }

  #[test]
  fn test_mixed_valid_and_malformed_rows() {
    let inv = inventory();
    let text = "codigo;nombre;precio\n\
                1;Uno;1\n\
                ;Sin codigo;2\n\
                2;Dos;2\n\
                3;;3\n\
                4;Cuatro;x\n\
                5;Cinco;5\n";
    let summary = inv.import_replacing_all(text).unwrap();
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.errors, 3);
    let codes: Vec<String> = inv.list_all().unwrap().into_iter().map(|p| p.code).collect();
    assert_eq!(codes, vec!["1", "2", "5"]);
  }

  #[test]
  fn test_export_then_import_round_trip() {
    let inv = inventory();
    inv.register(&form("A1", "Widget", "9.99")).unwrap();
    inv.register(&form("B2", "Tornillo \"largo\", 3/8", "0.35")).unwrap();
    let before = inv.list_all().unwrap();

    let text = inv.export_all().unwrap();
    let summary = inv.import_replacing_all(&text).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 0);
    assert_eq!(inv.list_all().unwrap(), before);
  }

  #[test]
  fn test_clear_all() {
    let inv = Inventory::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
    for i in 0..10 {
      inv
        .register(&form(&format!("P{}", i), "Item", "1"))
        .unwrap();
    }
    assert_eq!(inv.clear_all().unwrap(), 10);
    assert!(inv.list_all().unwrap().is_empty());
  }

  #[test]
  fn test_delete_one() {
    let inv = inventory();
    inv.register(&form("A", "Alpha", "1")).unwrap();
    inv.register(&form("B", "Bravo", "2")).unwrap();
    inv.delete("A").unwrap();
    assert!(inv.get("A").unwrap().is_none());
    assert_eq!(inv.count().unwrap(), 1);
  }
}
