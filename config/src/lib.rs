//! # Configuration Management for sqlweave
//!
//! This crate provides the configuration structures read by the sqlweave
//! facade: statement logging and slow-query settings, and the metrics switch.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AppConfig, MetricsConfig, QueryConfig};
//!
//! let config = AppConfig {
//!     query: QueryConfig::new(true, 250, 1024),
//!     metrics: MetricsConfig::new(true),
//! };
//! assert_eq!(config.query.slow_query_threshold_ms, 250);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [query]
//! log_statements = true
//! slow_query_threshold_ms = 500
//! max_logged_sql_length = 2048
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from SQLWEAVE_CONFIG or ./sqlweave.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./sqlweave.toml";
const CONFIG_PATH_VAR: &str = "SQLWEAVE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub query: QueryConfig,
    pub metrics: MetricsConfig,
}

/// Statement logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Log every rendered statement at debug level
    pub log_statements: bool,
    /// Warn when a statement runs longer than this; 0 disables the warning
    pub slow_query_threshold_ms: u64,
    /// Logged SQL is cut to this many bytes
    pub max_logged_sql_length: usize,
}

/// Query metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            log_statements: false,
            slow_query_threshold_ms: 1000,
            max_logged_sql_length: 1024,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load configuration from the TOML file named in the environment or the default path
    ///
    /// A missing `.env` file is fine. When neither `SQLWEAVE_CONFIG` nor
    /// `./sqlweave.toml` is present the defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let config = match env::var(CONFIG_PATH_VAR) {
            Ok(config_path) => Self::from_file(&config_path)?,
            Err(env::VarError::NotPresent) => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    Self::from_file(DEFAULT_CONFIG_PATH)?
                } else {
                    Self::default()
                }
            }
            Err(e) => return Err(e.into()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.max_logged_sql_length == 0 {
            return Err(ConfigError::Invalid(
                "Query max_logged_sql_length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl QueryConfig {
    /// Create a new query configuration
    pub fn new(
        log_statements: bool,
        slow_query_threshold_ms: u64,
        max_logged_sql_length: usize,
    ) -> Self {
        Self {
            log_statements,
            slow_query_threshold_ms,
            max_logged_sql_length,
        }
    }

    /// Whether slow-query warnings are on
    pub fn warns_on_slow_queries(&self) -> bool {
        self.slow_query_threshold_ms > 0
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}
