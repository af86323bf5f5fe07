//! Service configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use domo_types::DEFAULT_THRESHOLD;

/// Service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Simulation settings.
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.storage.validate());
        errors.extend(self.simulation.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: domo_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Sensor id the simulator writes measurements for.
    pub sensor_id: i64,
    /// Seconds between simulation ticks.
    pub interval_secs: u64,
    /// Actuation threshold in degrees Celsius.
    pub threshold: f64,
    /// Lower bound of the synthetic value range.
    pub value_min: f64,
    /// Upper bound of the synthetic value range.
    pub value_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sensor_id: 1,
            interval_secs: 10,
            threshold: DEFAULT_THRESHOLD,
            value_min: 20.0,
            value_max: 35.0,
        }
    }
}

impl SimulationConfig {
    /// The tick interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate simulation configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.sensor_id < 1 {
            errors.push(ValidationError {
                field: "simulation.sensor_id".to_string(),
                message: format!("sensor_id must be positive, got {}", self.sensor_id),
            });
        }

        if self.interval_secs == 0 {
            errors.push(ValidationError {
                field: "simulation.interval_secs".to_string(),
                message: "interval must be at least one second".to_string(),
            });
        }

        if !self.threshold.is_finite() {
            errors.push(ValidationError {
                field: "simulation.threshold".to_string(),
                message: format!("threshold must be finite, got {}", self.threshold),
            });
        }

        if !self.value_min.is_finite()
            || !self.value_max.is_finite()
            || self.value_min >= self.value_max
        {
            errors.push(ValidationError {
                field: "simulation.value_min".to_string(),
                message: format!(
                    "value range must satisfy min < max, got {}..{}",
                    self.value_min, self.value_max
                ),
            });
        }

        errors
    }
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("domo")
        .join("service.toml")
}

/// A single configuration validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    /// Failed to write the configuration file.
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration is invalid.
    #[error("Invalid configuration: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut config = Config::default();
        config.simulation.interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn test_inverted_value_range_is_rejected() {
        let mut config = Config::default();
        config.simulation.value_min = 40.0;
        config.simulation.value_max = 20.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_sensor_id_is_rejected() {
        let mut config = Config::default();
        config.simulation.sensor_id = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");

        let mut config = Config::default();
        config.simulation.threshold = 27.5;
        config.simulation.interval_secs = 5;
        config.save(&path).unwrap();

        let loaded = Config::load_validated(&path).unwrap();
        assert_eq!(loaded.simulation.threshold, 27.5);
        assert_eq!(loaded.simulation.interval_secs, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[simulation]\nthreshold = 30.0\n").unwrap();
        assert_eq!(config.simulation.threshold, 30.0);
        assert_eq!(config.simulation.interval_secs, 10);
        assert_eq!(config.simulation.sensor_id, 1);
    }
}
