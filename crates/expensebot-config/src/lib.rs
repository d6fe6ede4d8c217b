//! Configuration management for expensebot
//!
//! This module handles loading, validation, and management of
//! expensebot configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from the browser widget
    #[serde(default = "default_true")]
    pub cors_enable: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enable: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

/// Upload handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded files are spooled while being processed
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

/// Ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    /// What to do with rows whose amount has no numeric value
    #[serde(default)]
    pub invalid_amount: InvalidAmountPolicy,
}

/// Handling of rows whose `Amount` cell cannot be read as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidAmountPolicy {
    /// Drop the row and report a warning
    Skip,
    /// Keep the row with a zero amount and report a warning
    Zero,
    /// Fail the whole upload
    Reject,
}

impl Default for InvalidAmountPolicy {
    fn default() -> Self {
        InvalidAmountPolicy::Skip
    }
}

impl std::str::FromStr for InvalidAmountPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(InvalidAmountPolicy::Skip),
            "zero" => Ok(InvalidAmountPolicy::Zero),
            "reject" => Ok(InvalidAmountPolicy::Reject),
            _ => Err(format!("Invalid amount policy: {}", s)),
        }
    }
}

impl std::fmt::Display for InvalidAmountPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidAmountPolicy::Skip => write!(f, "skip"),
            InvalidAmountPolicy::Zero => write!(f, "zero"),
            InvalidAmountPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Reporting currency code shown in replies
    #[serde(default = "default_currency")]
    pub code: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
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
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload spool settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Ingestion policy
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::IoError)?;

        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.upload.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload.max_bytes".to_string(),
                reason: "Upload limit must be greater than 0".to_string(),
            });
        }

        if self.currency.code.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "currency.code".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================
