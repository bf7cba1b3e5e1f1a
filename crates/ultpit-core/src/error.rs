//! Error types for ultpit

use thiserror::Error;

/// Main error type for ultpit operations
#[derive(Debug, Error)]
pub enum UltpitError {
    /// Invalid grid, precedence or engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed, short or missing block values
    #[error("Input data error: {0}")]
    InputData(String),

    /// An optimization engine failed on a realization
    #[error("Engine error: {0}")]
    Engine(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ultpit operations
pub type Result<T> = std::result::Result<T, UltpitError>;
