//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path specified via `--config` CLI flag
//! 2. Default location:
//!    - **Linux/macOS:** `~/.cellpack-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.cellpack-mcp\config.json`
//!
//! A missing file at the default location is not an error; built-in
//! defaults are used instead.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!     "defaults": { "loss_percent": 20.0, "variation_percent": 100.0, "capacity_unit": "mAh" },
//!     "search": { "max_series": 20, "max_parallel": 20 },
//!     "schematic": { "max_width": 80, "max_height": 40 },
//!     "logging": { "level": "warn" }
//! }
//! ```

mod settings;

pub use settings::{
    Config, DefaultsConfig, LoggingConfig, SchematicConfig, SearchConfig, MAX_SEARCH_BOUND,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.cellpack-mcp/`
/// - **Windows:** `%USERPROFILE%\.cellpack-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".cellpack-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location and
/// falls back to [`Config::default`] when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are unknown or fail validation
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => read_config(p),
        None => match default_config_path() {
            Some(p) if p.exists() => read_config(&p),
            _ => Ok(Config::default()),
        },
    }
}

/// Reads, parses and validates the configuration file at `path`.
fn read_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}
