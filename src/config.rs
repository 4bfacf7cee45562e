use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for header (defaults to "Inventario")
  pub title: Option<String>,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub export: ExportConfig,
  #[serde(default)]
  pub scanner: ScannerConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// Database file (default: $XDG_DATA_HOME/stockr/inventory.db)
  pub path: Option<PathBuf>,
  /// Upper bound on stored bytes; writes past it fail
  pub quota_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
  #[serde(default = "default_export_dir")]
  pub dir: PathBuf,
  #[serde(default = "default_export_file_name")]
  pub file_name: String,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      dir: default_export_dir(),
      file_name: default_export_file_name(),
    }
  }
}

fn default_export_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_export_file_name() -> String {
  "inventario.csv".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScannerConfig {
  /// External decoder to run, e.g. ["zbarcam", "--raw", "--nodisplay"].
  /// Without one, the scan prompt reads codes typed by a keyboard-wedge scanner.
  #[serde(default)]
  pub command: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Default filter when STOCKR_LOG is unset
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log directory (default: $XDG_DATA_HOME/stockr/logs)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      dir: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./stockr.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/stockr/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("stockr.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("stockr").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null; treat it as all defaults.
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Header title.
  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("Inventario")
  }

  /// Where `export` writes when no path is given.
  pub fn export_path(&self) -> PathBuf {
    self.export.dir.join(&self.export.file_name)
  }

  /// Directory for log files.
  pub fn log_dir(&self) -> Option<PathBuf> {
    self.log.dir.clone().or_else(|| {
      dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
        .map(|d| d.join("stockr").join("logs"))
    })
  }
}
