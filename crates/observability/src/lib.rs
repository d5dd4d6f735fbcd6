//! Process-wide tracing/logging setup.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, LogFormat, TracingConfig, UnknownLogFormat};

/// Initialize tracing from `RUST_LOG` (or `info`) with JSON output.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(&TracingConfig::from_env());
}

/// Initialize tracing from explicit configuration.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_with(config: &TracingConfig) {
    tracing::init(config);
}
