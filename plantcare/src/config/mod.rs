//! Configuration for the `PlantCare` engine.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. TOML config file (an explicit path, or `~/.config/plantcare/config.toml`)
//! 2. Compiled defaults
//!
//! Missing default config file is not an error (defaults are used). An
//! explicit path that doesn't exist is an error.

use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    schedule: ScheduleFileConfig,
    logging: LoggingFileConfig,
}

/// `[schedule]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ScheduleFileConfig {
    default_horizon_days: Option<u32>,
    max_horizon_days: Option<u32>,
}

/// `[logging]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LoggingFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Logging configuration (used by [`crate::logging::init_logging`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter string, e.g. `info` or `plantcare=debug`.
    pub level: String,
    /// Log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Fully resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Horizon used when upcoming tasks are requested without one.
    pub default_horizon_days: u32,
    /// Upper bound applied to every requested horizon.
    pub max_horizon_days: u32,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: 14,
            max_horizon_days: 365,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file layered over defaults.
    ///
    /// If `explicit_path` is given and cannot be read, returns an error.
    /// Otherwise the default path is tried and a missing file is treated
    /// as an empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = load_config_file(explicit_path)?;
        Ok(Self::resolve(&file))
    }

    /// Parse configuration from a TOML string layered over defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseToml`] if the string is not valid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(Self::resolve(&file))
    }

    /// Resolve an `EngineConfig` from a parsed config file.
    ///
    /// Priority: file > default. The default horizon never exceeds the
    /// maximum.
    fn resolve(file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let max_horizon_days = file
            .schedule
            .max_horizon_days
            .unwrap_or(defaults.max_horizon_days);

        Self {
            default_horizon_days: file
                .schedule
                .default_horizon_days
                .unwrap_or(defaults.default_horizon_days)
                .min(max_horizon_days),
            max_horizon_days,
            logging: LoggingConfig {
                level: file
                    .logging
                    .level
                    .clone()
                    .unwrap_or(defaults.logging.level),
                file: file.logging.file.clone(),
            },
        }
    }

    /// Caps a requested horizon at [`max_horizon_days`](Self::max_horizon_days).
    #[must_use]
    pub fn clamp_horizon(&self, days: u32) -> u32 {
        days.min(self.max_horizon_days)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("plantcare").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
