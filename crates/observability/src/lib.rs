//! Tracing and logging (shared setup).

/// Logging configuration.
pub mod config;

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use config::{LogConfig, LogFormat};
