//! Configuration loading and validation for the isitup command

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

// Re-export Validate trait for derive macro
#[allow(unused_imports)]
use validator::Validate as _;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.storage.validate()?;
        self.probe.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Where the check records live
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StorageSettings {
    #[validate(custom = "validate_database_path")]
    pub database: PathBuf,

    /// How long to wait on a lock held by an overlapping invocation
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_busy_timeout")]
    pub busy_timeout: Duration,
}

/// Bounds on network probes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbeSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_connect_timeout")]
    pub connect_timeout: Duration,

    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_fetch_timeout")]
    pub fetch_timeout: Duration,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    pub level: Option<String>,

    #[validate(custom = "validate_log_format")]
    pub format: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("isitup.db"),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: isitup::checkers::DEFAULT_CONNECT_TIMEOUT,
            fetch_timeout: isitup::checkers::DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl LoggingSettings {
    /// True when JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

// Custom validators

fn validate_database_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("database_path_empty"));
    }
    Ok(())
}

fn validate_millis(value: &Duration, max: Duration, code: &'static str) -> Result<(), ValidationError> {
    if *value < Duration::from_millis(1) || *value > max {
        return Err(ValidationError::new(code));
    }
    Ok(())
}

fn validate_busy_timeout(value: &Duration) -> Result<(), ValidationError> {
    validate_millis(value, Duration::from_secs(60), "busy_timeout_out_of_range")
}

fn validate_connect_timeout(value: &Duration) -> Result<(), ValidationError> {
    validate_millis(value, Duration::from_secs(60), "connect_timeout_out_of_range")
}

fn validate_fetch_timeout(value: &Duration) -> Result<(), ValidationError> {
    validate_millis(value, Duration::from_secs(120), "fetch_timeout_out_of_range")
}

fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "text" | "json" => Ok(()),
        _ => Err(ValidationError::new("log_format_unknown")),
    }
}

// Configuration loading implementation

impl Config {
    /// Load configuration from default search paths
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/isitup/isitup.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./isitup.yaml"));

        paths.into_iter().find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/isitup/isitup.yaml"))
    }
}
