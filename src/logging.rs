//! File logging. The terminal belongs to the UI, so logs go to a daily
//! rolling file instead of stdout.

use crate::config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "STOCKR_LOG";

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the program so buffered lines are flushed on exit.
pub fn init(config: &Config) -> Option<WorkerGuard> {
  let filter = EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(&config.log.level))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  let dir = config.log_dir()?;
  if let Err(e) = std::fs::create_dir_all(&dir) {
    eprintln!("Warning: failed to create log directory {}: {}", dir.display(), e);
    return None;
  }

  let file_appender = tracing_appender::rolling::daily(&dir, "stockr.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  let layer = tracing_subscriber::fmt::layer()
    .with_writer(writer)
    .with_ansi(false)
    .with_target(false);

  if tracing_subscriber::registry()
    .with(filter)
    .with(layer)
    .try_init()
    .is_err()
  {
    return None;
  }

  Some(guard)
}
