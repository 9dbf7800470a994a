//! MDB configuration module.
//!
//! Provides configuration file support via `mdb.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`MDB_*`)
//! 2. Configuration file (`mdb.toml`)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Storage configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Number of samples retained per series in the ring buffer.
    pub ring_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { ring_capacity: 6 }
    }
}

/// Index configuration section: initial hash-table and identifier-set
/// capacities for the forward and reverse indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Initial capacity of the family-name hash table.
    pub family_table_size: usize,
    /// Initial capacity of the forward (canonical key) hash table.
    pub metric_table_size: usize,
    /// Initial capacity of the reverse-index name-level hash table.
    pub name_table_size: usize,
    /// Initial capacity of each reverse-index label-level hash table.
    pub label_table_size: usize,
    /// Initial capacity of each reverse-index value-level hash table.
    pub value_table_size: usize,
    /// Initial capacity of a per-series identifier set.
    pub series_initial_capacity: usize,
    /// Initial capacity of a query-scoped temporary identifier set.
    pub query_temp_initial_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            family_table_size: 256,
            metric_table_size: 256,
            name_table_size: 256,
            label_table_size: 4,
            value_table_size: 4,
            series_initial_capacity: 1024,
            query_temp_initial_capacity: 8,
        }
    }
}

/// Limits configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum label pairs per series.
    pub max_labels_per_series: usize,
    /// Maximum family name length, in bytes.
    pub max_name_len: usize,
    /// Maximum label name/value length, in bytes.
    pub max_label_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_labels_per_series: 64,
            max_name_len: 256,
            max_label_len: 1024,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main MDB configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MdbConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Index configuration.
    pub index: IndexConfig,
    /// Limits configuration.
    pub limits: LimitsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl MdbConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("mdb.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MDB_").split("_").lowercase(false));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.ring_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "storage.ring_capacity".to_string(),
                message: "must be >= 1".to_string(),
            });
        }

        for (key, value) in [
            ("index.family_table_size", self.index.family_table_size),
            ("index.metric_table_size", self.index.metric_table_size),
            ("index.name_table_size", self.index.name_table_size),
            ("index.label_table_size", self.index.label_table_size),
            ("index.value_table_size", self.index.value_table_size),
        ] {
            if value == 0 || !value.is_power_of_two() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("value {value} must be a non-zero power of two"),
                });
            }
        }

        if self.limits.max_labels_per_series == 0 {
            return Err(ConfigError::InvalidValue {
                key: "limits.max_labels_per_series".to_string(),
                message: "must be >= 1".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = MdbConfig::default();
        assert_eq!(cfg.storage.ring_capacity, 6);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_non_power_of_two_table_size() {
        let mut cfg = MdbConfig::default();
        cfg.index.name_table_size = 300;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_ring_capacity() {
        let mut cfg = MdbConfig::default();
        cfg.storage.ring_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = MdbConfig::default();
        let toml_str = cfg.to_toml().unwrap();
        let parsed = MdbConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.storage.ring_capacity, cfg.storage.ring_capacity);
    }

    #[test]
    fn loads_overrides_from_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdb.toml");
        std::fs::write(&path, "[storage]\nring_capacity = 42\n").unwrap();

        let cfg = MdbConfig::load_from_path(&path).unwrap();
        assert_eq!(cfg.storage.ring_capacity, 42);
        assert_eq!(cfg.index.family_table_size, 256);
    }
}
