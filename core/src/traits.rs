//! Coordination client trait
//!
//! The harness is agnostic to the coordination protocol. It consumes exactly
//! the operations below; implementations live in the `zk-bench-clients` crate.

use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// Coordination Client Trait
// ============================================================================

/// Session-based client for a hierarchical coordination service
///
/// One instance represents one live session. The harness shares a single
/// session across every worker, so implementations must tolerate
/// unsynchronized concurrent calls from many tasks.
#[async_trait]
pub trait CoordinationClient: Send + Sync {
    /// Backend identifier (e.g., "zookeeper", "memory")
    fn backend_name(&self) -> &str;

    /// Endpoint this session is connected to
    fn endpoint(&self) -> &str;

    /// Check whether a node exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, CoordinationError>;

    /// Create a node and return the path the service assigned
    ///
    /// For [`NodeMode::EphemeralSequential`] `path` is a prefix; the service
    /// appends a unique, monotonically increasing suffix. Access control is
    /// always the open (world) ACL.
    async fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        mode: NodeMode,
    ) -> Result<String, CoordinationError>;

    /// Count the direct children of `path`
    async fn count_children(&self, path: &str) -> Result<usize, CoordinationError>;

    /// Close the session (best-effort)
    ///
    /// Ephemeral nodes created by this session disappear once it closes.
    async fn close(&self) -> Result<(), CoordinationError>;
}

/// Lifetime and naming semantics of a created node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMode {
    /// Outlives the session, exact path
    Persistent,
    /// Removed with the session, server-assigned ordered suffix
    EphemeralSequential,
}

impl NodeMode {
    /// Whether the node is tied to the creating session
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, NodeMode::EphemeralSequential)
    }

    /// Whether the service appends a sequence suffix
    pub fn is_sequential(&self) -> bool {
        matches!(self, NodeMode::EphemeralSequential)
    }
}

/// Errors reported by a coordination client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinationError {
    /// Could not reach the service, or the connection was lost
    #[error("connection error: {0}")]
    Connection(String),

    /// A node already exists at the path
    #[error("node already exists: {0}")]
    NodeExists(String),

    /// The node (or its parent) does not exist
    #[error("no such node: {0}")]
    NoNode(String),

    /// The session expired or was closed
    #[error("session expired")]
    SessionExpired,

    /// The service did not answer in time
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The executing context was interrupted before the call completed
    #[error("operation interrupted: {0}")]
    Interrupted(String),

    /// Any other error reported by the service
    #[error("remote error: {0}")]
    Remote(String),
}

impl CoordinationError {
    /// Whether this error means the node is already present
    pub fn is_node_exists(&self) -> bool {
        matches!(self, CoordinationError::NodeExists(_))
    }

    /// Whether a later attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoordinationError::Connection(_)
                | CoordinationError::Timeout(_)
                | CoordinationError::Interrupted(_)
        )
    }
}
