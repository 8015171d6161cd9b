//! # Configuration Management
//!
//! Centralized configuration for the level loader and tooling.
//!
//! This module provides structured configuration for where level data lives,
//! how long a fetch may take, and how logging is set up.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Security Considerations
//! - The container size limit bounds memory use before authentication
//! - The fetch timeout keeps a stalled download from hanging every lookup

use crate::error::{LevelError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Current supported container format version
pub const FORMAT_VERSION: u8 = 1;

/// Magic bytes identifying the framed block ("LVL1")
pub const MAGIC_BYTES: [u8; 4] = *b"LVL1";

/// Length of the CBC initialization vector
pub const IV_LENGTH: usize = 16;

/// Longest authentication tag accepted by the container parser
pub const MAX_TAG_LENGTH: usize = 64;

/// Max allowed container size (16 MB)
pub const MAX_CONTAINER_SIZE: usize = 16 * 1024 * 1024;

/// Default file name of the exported level container
pub const DEFAULT_LEVELS_FILE: &str = "levels.dat";

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LevelConfig {
    /// Where and how level data is fetched
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LevelConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| LevelError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| LevelError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| LevelError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override fields of an existing configuration from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(location) = std::env::var("LEVEL_VAULT_SOURCE") {
            self.source.location = location;
        }

        if let Ok(timeout) = std::env::var("LEVEL_VAULT_FETCH_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                self.source.fetch_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(size) = std::env::var("LEVEL_VAULT_MAX_CONTAINER_BYTES") {
            if let Ok(val) = size.parse::<usize>() {
                self.source.max_container_size = val;
            }
        }

        if let Ok(dimension) = std::env::var("LEVEL_VAULT_MAX_GRID_DIMENSION") {
            if let Ok(val) = dimension.parse::<usize>() {
                self.source.max_grid_dimension = Some(val);
            }
        }

        if let Ok(level) = std::env::var("LEVEL_VAULT_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                self.logging.log_level = val;
            }
        }
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LevelError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| LevelError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.source.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LevelError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Level source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local path, `file://` URI or `http(s)://` URL of the level container
    pub location: String,

    /// Upper bound for reading the whole container
    #[serde(with = "duration_serde")]
    pub fetch_timeout: Duration,

    /// Largest container accepted, in bytes
    pub max_container_size: usize,

    /// Optional cap on a level's declared rows and columns; records beyond it
    /// are skipped. Unset means every declared size is built.
    pub max_grid_dimension: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: String::from(DEFAULT_LEVELS_FILE),
            fetch_timeout: timeout::DEFAULT_FETCH_TIMEOUT,
            max_container_size: MAX_CONTAINER_SIZE,
            max_grid_dimension: None,
        }
    }
}

impl SourceConfig {
    /// Validate source configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.location.trim().is_empty() {
            errors.push("Source location cannot be empty".to_string());
        } else if let Some((scheme, _)) = self.location.split_once("://") {
            if !matches!(scheme, "file" | "http" | "https") {
                errors.push(format!(
                    "Unsupported source scheme: '{scheme}' (expected file, http or https)"
                ));
            }
        }

        if self.fetch_timeout.as_millis() < 100 {
            errors.push("Fetch timeout too short (minimum: 100ms)".to_string());
        } else if self.fetch_timeout.as_secs() > 600 {
            errors.push("Fetch timeout too long (maximum: 600s)".to_string());
        }

        if self.max_container_size == 0 {
            errors.push("Max container size cannot be 0".to_string());
        } else if self.max_container_size > i32::MAX as usize {
            errors.push(format!(
                "Max container size too large: {} bytes (format limit: {} bytes)",
                self.max_container_size,
                i32::MAX
            ));
        }

        if self.max_grid_dimension == Some(0) {
            errors.push("Max grid dimension cannot be 0 (leave it unset for no limit)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("level-vault"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        crate::utils::timeout::saturating_millis(*duration).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
