//! Console configuration
//!
//! Configuration for the console's API endpoint, local state directory and
//! logging, loadable from a TOML file.

use crate::error::{ChargebackError, ChargebackResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Billing API endpoint
    #[serde(default)]
    pub api: ApiConfig,
    /// Local state persistence
    #[serde(default)]
    pub storage: StateConfig,
    /// Logging setup
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Billing API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the billing API, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Bounded timeout for auth and feature requests, in seconds.
    /// A timed-out request is treated the same as a failed fetch.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Local state persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding the persisted session credential
    pub state_dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        let state_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chargeback");

        Self { state_dir }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ChargebackResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ChargebackError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ConsoleConfig = toml::from_str(&content).map_err(|e| ChargebackError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ChargebackResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ChargebackError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| ChargebackError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ChargebackResult<()> {
        if self.api.base_url.is_empty() {
            return Err(ChargebackError::Validation {
                message: "API base_url must not be empty".to_string(),
                field: Some("api.base_url".to_string()),
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.base_url to the billing API endpoint"),
            });
        }

        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ChargebackError::Validation {
                message: format!("API base_url is not a valid URL: {}", self.api.base_url),
                field: Some("api.base_url".to_string()),
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use an absolute http(s) URL"),
            });
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ChargebackError::Validation {
                message: "request_timeout_secs must be greater than 0".to_string(),
                field: Some("api.request_timeout_secs".to_string()),
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.request_timeout_secs to a positive value"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ConsoleConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_empty_base_url() {
        let mut config = ConsoleConfig::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = ConsoleConfig::default();
        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");

        let mut config = ConsoleConfig::default();
        config.api.base_url = "https://billing.example.com".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = ConsoleConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://billing.example.com");
        assert_eq!(loaded.api.request_timeout_secs, 10);
    }
}
