//! services/notifier/src/error.rs
//!
//! Defines the primary error type for the notifier service.

use crate::config::ConfigError;
use roster_notify_core::ports::PortError;

/// The primary error type for the `notifier` service.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., reading a data file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a malformed JSON data file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
