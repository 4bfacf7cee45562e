mod app;
mod cli;
mod commands;
mod config;
mod event;
mod inventory;
mod logging;
mod scanner;
mod store;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store::{MemoryStore, RecordStore, SqliteStore};

/// `--db` value that keeps the inventory in memory for one run
const IN_MEMORY_DB: &str = ":memory:";

#[derive(Parser, Debug)]
#[command(name = "stockr")]
#[command(about = "A terminal inventory for a small shop: search, register, scan, import and export products")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./stockr.yaml or $XDG_CONFIG_HOME/stockr/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Inventory database file, or :memory: (default: $XDG_DATA_HOME/stockr/inventory.db)
  #[arg(long, global = true)]
  db: Option<PathBuf>,

  /// Run a single command instead of the terminal UI
  #[command(subcommand)]
  command: Option<cli::Command>,
}

fn open_store(path: Option<&Path>, quota_bytes: Option<u64>) -> Result<Arc<dyn RecordStore>> {
  if path.is_some_and(|p| p.as_os_str() == IN_MEMORY_DB) {
    return Ok(Arc::new(MemoryStore::new().with_quota(quota_bytes)));
  }
  let store = SqliteStore::open(path)
    .map_err(|e| eyre!("Failed to open inventory: {}", e))?
    .with_quota(quota_bytes);
  Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config);

  // --db overrides the configured store location
  let db_path = args.db.or_else(|| config.storage.path.clone());
  let store = open_store(db_path.as_deref(), config.storage.quota_bytes)?;
  let inventory = inventory::Inventory::new(store);

  match args.command {
    Some(command) => {
      let mut stdout = std::io::stdout().lock();
      cli::run(command, &inventory, &config, &mut stdout)?;
    }
    None => {
      // Initialize and run the app
      let mut app = app::App::new(config, inventory);
      app.run().await?;
    }
  }

  Ok(())
}
