//! Configuration loading from the environment.

use thiserror::Error;

use stockpulse_observability::{LogFormat, TracingConfig};

pub const ENV_DATABASE_URL: &str = "STOCKPULSE_DATABASE_URL";
pub const ENV_DB_MAX_CONNECTIONS: &str = "STOCKPULSE_DB_MAX_CONNECTIONS";
pub const ENV_LOG_FORMAT: &str = "STOCKPULSE_LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Postgres connection string; `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub tracing: TracingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            tracing: TracingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (variable name to value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty(ENV_DATABASE_URL);

        let max_connections = match non_empty(ENV_DB_MAX_CONNECTIONS) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: ENV_DB_MAX_CONNECTIONS,
                        value: raw,
                    });
                }
            },
            None => defaults.max_connections,
        };

        let format = match non_empty(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: ENV_LOG_FORMAT,
                message: e.to_string(),
            })?,
            None => defaults.tracing.format,
        };

        let filter = non_empty(ENV_LOG_FILTER).unwrap_or(defaults.tracing.filter);

        Ok(Self {
            database_url,
            max_connections,
            tracing: TracingConfig { filter, format },
        })
    }

    pub fn uses_database(&self) -> bool {
        self.database_url.is_some()
    }
}
