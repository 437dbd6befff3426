//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pack::{CapacityUnit, SearchBounds};
use crate::schematic::{SchematicOptions, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};

/// Largest search bound accepted from configuration.
pub const MAX_SEARCH_BOUND: u32 = 1000;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Default input values.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Preference search grid.
    #[serde(default)]
    pub search: SearchConfig,

    /// Schematic rendering limits.
    #[serde(default)]
    pub schematic: SchematicConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = &self.defaults;
        if !(0.0..100.0).contains(&defaults.loss_percent) {
            return Err(invalid(format!(
                "Invalid default loss percentage {}. Must be in [0, 100)",
                defaults.loss_percent
            )));
        }
        if !defaults.variation_percent.is_finite() || defaults.variation_percent <= 0.0 {
            return Err(invalid(format!(
                "Invalid default variation percentage {}. Must be greater than 0",
                defaults.variation_percent
            )));
        }

        for (name, bound) in [
            ("max_series", self.search.max_series),
            ("max_parallel", self.search.max_parallel),
        ] {
            if !(1..=MAX_SEARCH_BOUND).contains(&bound) {
                return Err(invalid(format!(
                    "Invalid search bound {name} = {bound}. Must be in 1..={MAX_SEARCH_BOUND}"
                )));
            }
        }

        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.schematic.max_width) {
            return Err(invalid(format!(
                "Invalid schematic max_width {}. Must be in {MIN_WIDTH}..={MAX_WIDTH}",
                self.schematic.max_width
            )));
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.schematic.max_height) {
            return Err(invalid(format!(
                "Invalid schematic max_height {}. Must be in {MIN_HEIGHT}..={MAX_HEIGHT}",
                self.schematic.max_height
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError { message }
}

/// Values used when a caller leaves an input out.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// System losses in percent.
    /// Default: 20
    #[serde(default = "default_loss_percent")]
    pub loss_percent: f64,

    /// Delivered share of the rated cell capacity, in percent.
    /// Default: 100
    #[serde(default = "default_variation_percent")]
    pub variation_percent: f64,

    /// Unit of the target capacity: "mAh" or "Ah".
    /// Default: "mAh"
    #[serde(default)]
    pub capacity_unit: CapacityUnit,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            loss_percent: default_loss_percent(),
            variation_percent: default_variation_percent(),
            capacity_unit: CapacityUnit::default(),
        }
    }
}

const fn default_loss_percent() -> f64 {
    20.0
}

const fn default_variation_percent() -> f64 {
    100.0
}

/// Preference search grid bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Largest series count considered.
    #[serde(default = "default_search_bound")]
    pub max_series: u32,

    /// Largest parallel count considered.
    #[serde(default = "default_search_bound")]
    pub max_parallel: u32,
}

impl SearchConfig {
    /// Returns the configured bounds.
    #[must_use]
    pub const fn bounds(&self) -> SearchBounds {
        SearchBounds::new(self.max_series, self.max_parallel)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_series: default_search_bound(),
            max_parallel: default_search_bound(),
        }
    }
}

const fn default_search_bound() -> u32 {
    20
}

/// Schematic rendering limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchematicConfig {
    /// Maximum diagram width in characters.
    #[serde(default = "default_max_width")]
    pub max_width: usize,

    /// Maximum diagram height in lines.
    #[serde(default = "default_max_height")]
    pub max_height: usize,
}

impl SchematicConfig {
    /// Returns the configured rendering options.
    #[must_use]
    pub const fn options(&self) -> SchematicOptions {
        SchematicOptions {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

impl Default for SchematicConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

const fn default_max_width() -> usize {
    80
}

const fn default_max_height() -> usize {
    40
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
