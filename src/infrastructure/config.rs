//! Configuration infrastructure
//!
//! Contains configuration loading and management for grading lookups.
//!
//! Sources are layered with the `config` crate:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional config file (TOML/JSON/YAML by extension)
//! 3. `CHESS_GRADING_*` environment variables (`__` separates sections)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default values used when no configuration source overrides them
pub mod defaults {
    pub const LANDING_URL: &str = "https://www.chessscotland.com/grading";
    pub const FORM_URL: &str = "https://www.chessscotland.com/handle-form";
    pub const ORIGIN: &str = "https://www.chessscotland.com";

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    pub const MIN_NAME_LENGTH: usize = 3;
    pub const REBOOTSTRAP_ON_TOKEN_REJECTION: bool = true;

    pub const CLUBS_PATH: &str = "clubs.csv";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;

    pub const ENV_PREFIX: &str = "CHESS_GRADING";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub http: HttpSettings,
    pub resolver: ResolverConfig,
    pub clubs: ClubsConfig,
    pub logging: LoggingConfig,
}

/// Remote grading site endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Landing page carrying the CSRF token
    pub landing_url: String,
    /// Form handler receiving search POSTs
    pub form_url: String,
    /// Value of the `Origin` header on search POSTs
    pub origin: String,
}

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    /// Deadline for any single request
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

/// Query resolution behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Names shorter than this are rejected without searching
    pub min_name_length: usize,
    /// Re-open the session once per batch when a search token is rejected
    pub rebootstrap_on_token_rejection: bool,
}

/// Club reference table location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubsConfig {
    pub path: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console (stderr) output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            landing_url: defaults::LANDING_URL.to_string(),
            form_url: defaults::FORM_URL.to_string(),
            origin: defaults::ORIGIN.to_string(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_name_length: defaults::MIN_NAME_LENGTH,
            rebootstrap_on_token_rejection: defaults::REBOOTSTRAP_ON_TOKEN_REJECTION,
        }
    }
}

impl Default for ClubsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::CLUBS_PATH),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from an optional file plus the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every request fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("endpoint.landing_url", &self.endpoint.landing_url),
            ("endpoint.form_url", &self.endpoint.form_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "http.timeout_seconds must be greater than 0".to_string(),
            });
        }

        if self.http.max_requests_per_second == 0 {
            return Err(ConfigError::Validation {
                message: "http.max_requests_per_second must be greater than 0".to_string(),
            });
        }

        if self.resolver.min_name_length == 0 {
            return Err(ConfigError::Validation {
                message: "resolver.min_name_length must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration manager for locating the per-user config file
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> anyhow::Result<PathBuf> {
        use anyhow::Context;
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("chess-grading");
        Ok(config_dir)
    }

    pub fn new() -> anyhow::Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.toml");
        Ok(Self { config_path })
    }

    /// Load the explicit file if given, otherwise the per-user file when it
    /// exists, otherwise defaults (environment overrides apply in every case).
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return AppConfig::load(Some(path));
        }

        if self.config_path.exists() {
            info!("Loading configuration from {}", self.config_path.display());
            AppConfig::load(Some(&self.config_path))
        } else {
            AppConfig::load(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.resolver.min_name_length, 3);
        assert!(config.endpoint.landing_url.ends_with("/grading"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[http]\ntimeout_seconds = 4\n\n[clubs]\npath = \"data/clubs.csv\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.http.timeout_seconds, 4);
        assert_eq!(config.http.max_requests_per_second, defaults::MAX_REQUESTS_PER_SECOND);
        assert_eq!(config.clubs.path, PathBuf::from("data/clubs.csv"));
        assert_eq!(config.endpoint.form_url, defaults::FORM_URL);
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.http.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }
}
