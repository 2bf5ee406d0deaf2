//! Error types for zk-bench-core
//!
//! Only session-fatal conditions are represented here. A failed create inside
//! a worker never becomes a `BenchError`; see [`crate::worker::OperationOutcome`].

use thiserror::Error;

use crate::traits::CoordinationError;

/// Session-fatal harness error
///
/// Any of these aborts the run before a result is produced.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// A required builder field was never set
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// The coordination session could not be opened
    #[error("failed to open session with {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialled
        endpoint: String,
        /// Underlying client error
        #[source]
        source: CoordinationError,
    },

    /// The root node could not be checked or created
    #[error("failed to ensure root node {path}: {source}")]
    EnsureRoot {
        /// Root path
        path: String,
        /// Underlying client error
        #[source]
        source: CoordinationError,
    },

    /// The final child count query failed
    #[error("failed to count children of {path}: {source}")]
    CountChildren {
        /// Root path
        path: String,
        /// Underlying client error
        #[source]
        source: CoordinationError,
    },
}

impl BenchError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        BenchError::Config(message.into())
    }

    /// Create a missing configuration error
    pub fn missing_config(field: &'static str) -> Self {
        BenchError::MissingConfig(field)
    }

    /// Wrap a failed session open
    pub fn connect(endpoint: impl Into<String>, source: CoordinationError) -> Self {
        BenchError::Connect {
            endpoint: endpoint.into(),
            source,
        }
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
