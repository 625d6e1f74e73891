//! Bootstrap configuration loading and config file resolution
//!
//! The TOML file only carries bootstrap concerns (logging, export path,
//! processing budget, integrity weighting). Everything has a built-in
//! default, so a missing file never prevents startup.
//!
//! # Config File Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`ETHNOPATH_CONFIG`)
//! 3. Platform config directory (`<config_dir>/ethnopath/<module>.toml`)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ETHNOPATH_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path of the JSON export written at the end of a run
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Wall-clock budget per submission in milliseconds (no budget if absent)
    #[serde(default)]
    pub submission_timeout_ms: Option<u64>,

    /// Upper bound on submissions processed concurrently
    #[serde(default)]
    pub max_concurrent_submissions: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Integrity score weighting (optional)
    #[serde(default)]
    pub integrity: Option<IntegritySection>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// `[integrity]` table: relative weights of the integrity score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegritySection {
    pub compliance_weight: f64,
    pub confidence_weight: f64,
    pub retention_weight: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves which config file (if any) a module should read
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    /// Create resolver for a module (e.g., "digitizer")
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Resolve config file path following the documented priority order
    ///
    /// Returns `None` when no source names a file and the platform default
    /// does not exist.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_arg {
            debug!("Config file from command line: {}", path.display());
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                debug!("Config file from {}: {}", CONFIG_ENV_VAR, path);
                return Some(PathBuf::from(path));
            }
        }

        let default_path = self.default_config_path()?;
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    }

    /// Platform default location: `<config_dir>/ethnopath/<module>.toml`
    pub fn default_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| {
            d.join("ethnopath")
                .join(format!("{}.toml", self.module_name))
        })
    }

    /// Load configuration, degrading to defaults on any failure
    ///
    /// A missing or malformed file is logged as a warning and never
    /// terminates startup.
    pub fn load_or_default(&self, cli_arg: Option<&Path>) -> TomlConfig {
        let Some(path) = self.resolve(cli_arg) else {
            info!("No config file found for {}, using built-in defaults", self.module_name);
            return TomlConfig::default();
        };

        match load_toml_config(&path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load config {}: {}. Using built-in defaults.",
                    path.display(),
                    e
                );
                TomlConfig::default()
            }
        }
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Write config to TOML file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
