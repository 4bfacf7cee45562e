//! Non-interactive subcommands.

use crate::config::Config;
use crate::inventory::{Inventory, Product, ProductForm};
use crate::ui::renderfns::format_price;
use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
  /// Print every product, sorted by code
  List,

  /// Print products whose code or name contains QUERY
  Search { query: String },

  /// Register a product, replacing any with the same code
  Add {
    code: String,
    name: String,
    /// Price, e.g. 12.50
    #[arg(allow_hyphen_values = true)]
    price: String,
  },

  /// Delete a product by code
  Delete { code: String },

  /// Replace the whole inventory with a CSV file
  Import {
    file: PathBuf,
    /// Confirm that existing products are deleted
    #[arg(short, long)]
    yes: bool,
  },

  /// Write the inventory as CSV (default: export.dir/export.file_name, `-` for stdout)
  Export { path: Option<PathBuf> },

  /// Delete every product
  Clear {
    /// Confirm the deletion
    #[arg(short, long)]
    yes: bool,
  },
}

/// Run a subcommand, writing results to `out`
pub fn run(
  command: Command,
  inventory: &Inventory,
  config: &Config,
  out: &mut impl Write,
) -> Result<()> {
  match command {
    Command::List => print_products(out, &inventory.list_all()?)?,
    Command::Search { query } => {
      let found = inventory.search(&query)?;
      if found.is_empty() {
        writeln!(out, "No products found")?;
      } else {
        print_products(out, &found)?;
      }
    }
    Command::Add { code, name, price } => {
      let product = inventory.register(&ProductForm::new(code, name, price))?;
      writeln!(
        out,
        "Saved {} ({})",
        product.code,
        format_price(product.price)
      )?;
    }
    Command::Delete { code } => {
      let code = code.trim();
      if inventory.get(code)?.is_none() {
        return Err(eyre!("No product with code {}", code));
      }
      inventory.delete(code)?;
      writeln!(out, "Deleted {}", code)?;
    }
    Command::Import { file, yes } => {
      if !yes {
        return Err(eyre!(
          "import replaces the whole inventory; re-run with --yes to confirm"
        ));
      }
      let text = std::fs::read_to_string(&file)
        .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
      let summary = inventory.import_replacing_all(&text)?;
      for rejected in &summary.rejected {
        writeln!(out, "line {}: {}", rejected.line, rejected.reason)?;
      }
      writeln!(
        out,
        "Import: {} OK, {} errors",
        summary.imported, summary.errors
      )?;
    }
    Command::Export { path } => {
      let text = inventory.export_all()?;
      let path = path.unwrap_or_else(|| config.export_path());
      if path.as_os_str() == "-" {
        out.write_all(text.as_bytes())?;
      } else {
        std::fs::write(&path, text)
          .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
        writeln!(out, "Exported to {}", path.display())?;
      }
    }
    Command::Clear { yes } => {
      if !yes {
        return Err(eyre!(
          "clear deletes every product; re-run with --yes to confirm"
        ));
      }
      let removed = inventory.clear_all()?;
      writeln!(out, "Removed {} products", removed)?;
    }
  }
  Ok(())
}

fn print_products(out: &mut impl Write, products: &[Product]) -> Result<()> {
  if products.is_empty() {
    writeln!(out, "Inventory is empty")?;
    return Ok(());
  }
  let width = products
    .iter()
    .map(|p| p.code.chars().count())
    .max()
    .unwrap_or(0);
  for p in products {
    writeln!(
      out,
      "{:<width$}  {:>10}  {}",
      p.code,
      format_price(p.price),
      p.name,
      width = width
    )?;
  }
  Ok(())
}
