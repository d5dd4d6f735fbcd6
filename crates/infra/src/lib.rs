//! Infrastructure layer: config, Postgres stores, schema and runtime assembly.

pub mod bootstrap;
pub mod postgres;
pub mod schema;

/// Configuration loading and representation.
pub mod config;

pub use bootstrap::AppService;
pub use config::{AppConfig, ConfigError};
