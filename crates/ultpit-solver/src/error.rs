//! Engine failures and their status codes.

use std::time::Duration;

use thiserror::Error;
use ultpit_core::UltpitError;

/// Status reported by an engine that produced a selection.
pub const STATUS_OK: i32 = 0;

/// Failure of one engine solve.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Values and precedence don't describe a solvable problem
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// The external program could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external program exited unsuccessfully
    #[error("Solver process failed: {0}")]
    ProcessFailed(String),

    #[error("Solver process timed out after {0:?}")]
    Timeout(Duration),

    /// The external program printed something that isn't a cut
    #[error("Malformed solver output: {0}")]
    MalformedOutput(String),

    /// Broken solver invariant (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Non-zero status code for this failure.
    pub fn status(&self) -> i32 {
        match self {
            EngineError::InvalidProblem(_) => 2,
            EngineError::Spawn { .. } => 3,
            EngineError::Io(_) => 4,
            EngineError::ProcessFailed(_) => 5,
            EngineError::Timeout(_) => 6,
            EngineError::MalformedOutput(_) => 7,
            EngineError::Internal(_) => 70,
        }
    }
}

impl From<EngineError> for UltpitError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Internal(msg) => UltpitError::Internal(msg),
            other => UltpitError::Engine(other.to_string()),
        }
    }
}
