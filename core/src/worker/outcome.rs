//! Result of a single create attempt

use crate::traits::CoordinationError;

/// Outcome of one create issued by a worker
///
/// Consumed by the worker loop itself; a failure never leaves the iteration
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The service created a node at this path
    Created(String),
    /// The call failed or was interrupted
    Failed(CoordinationError),
}

impl From<Result<String, CoordinationError>> for OperationOutcome {
    fn from(result: Result<String, CoordinationError>) -> Self {
        match result {
            Ok(path) => OperationOutcome::Created(path),
            Err(e) => OperationOutcome::Failed(e),
        }
    }
}
