mod inventory;
mod product_form;

pub use inventory::InventoryView;
pub use product_form::ProductFormView;
