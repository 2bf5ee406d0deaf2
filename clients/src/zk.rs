//! ZooKeeper client
//!
//! Wraps the blocking `zookeeper` session. Every call is dispatched onto
//! tokio's blocking pool so that many workers keep many requests outstanding
//! on the one session at the same time. Size the runtime's blocking pool to
//! at least the worker count, or the pool caps the concurrency under test.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use zk_bench_core::{CoordinationClient, CoordinationError, NodeMode};
use zookeeper::{Acl, CreateMode, WatchedEvent, Watcher, ZkError, ZooKeeper};

/// Logs session events; the benchmark sets no watches of its own
struct SessionWatcher {
    endpoint: String,
}

impl Watcher for SessionWatcher {
    fn handle(&self, event: WatchedEvent) {
        tracing::debug!(
            endpoint = %self.endpoint,
            keeper_state = ?event.keeper_state,
            event_type = ?event.event_type,
            path = ?event.path,
            "ZooKeeper session event"
        );
    }
}

/// One ZooKeeper session shared by every worker
///
/// # Concurrency limit
///
/// The underlying client is blocking, so each in-flight call occupies one
/// thread of tokio's blocking pool for its whole round trip. A run with `W`
/// workers therefore needs `W` OS threads to actually keep `W` requests
/// outstanding; with a smaller pool the effective concurrency is the pool
/// size. [`Backend::blocking_threads`](crate::Backend::blocking_threads)
/// gives the pool size the binary configures.
pub struct ZooKeeperClient {
    session: Arc<ZooKeeper>,
    endpoint: String,
    session_timeout: Duration,
}

impl ZooKeeperClient {
    /// Open a session
    ///
    /// `endpoint` is a ZooKeeper connect string (`host:port[,host:port]`).
    pub async fn connect(
        endpoint: &str,
        session_timeout: Duration,
    ) -> Result<Self, CoordinationError> {
        let connect_string = endpoint.to_string();
        let watcher = SessionWatcher {
            endpoint: endpoint.to_string(),
        };

        let session = tokio::task::spawn_blocking(move || {
            ZooKeeper::connect(&connect_string, session_timeout, watcher)
        })
        .await
        .map_err(|e| CoordinationError::Interrupted(e.to_string()))?
        .map_err(|e| CoordinationError::Connection(format!("{e:?}")))?;

        tracing::info!(endpoint, session_timeout = ?session_timeout, "ZooKeeper session opened");

        Ok(Self {
            session: Arc::new(session),
            endpoint: endpoint.to_string(),
            session_timeout,
        })
    }

    /// Run one session call on the blocking pool
    async fn blocking<T, F>(&self, path: &str, op: F) -> Result<T, CoordinationError>
    where
        F: FnOnce(&ZooKeeper) -> Result<T, ZkError> + Send + 'static,
        T: Send + 'static,
    {
        let session = Arc::clone(&self.session);

        match tokio::task::spawn_blocking(move || op(&session)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_zk_error(path, e, self.session_timeout)),
            Err(e) => Err(CoordinationError::Interrupted(e.to_string())),
        }
    }
}

/// Translate a ZooKeeper error code for `path`
fn map_zk_error(path: &str, err: ZkError, session_timeout: Duration) -> CoordinationError {
    match err {
        ZkError::NodeExists => CoordinationError::NodeExists(path.to_string()),
        ZkError::NoNode => CoordinationError::NoNode(path.to_string()),
        ZkError::ConnectionLoss => CoordinationError::Connection("connection lost".to_string()),
        ZkError::OperationTimeout => CoordinationError::Timeout(session_timeout),
        ZkError::SessionExpired => CoordinationError::SessionExpired,
        other => CoordinationError::Remote(format!("{other:?}")),
    }
}

fn create_mode(mode: NodeMode) -> CreateMode {
    match mode {
        NodeMode::Persistent => CreateMode::Persistent,
        NodeMode::EphemeralSequential => CreateMode::EphemeralSequential,
    }
}

#[async_trait]
impl CoordinationClient for ZooKeeperClient {
    fn backend_name(&self) -> &str {
        "zookeeper"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exists(&self, path: &str) -> Result<bool, CoordinationError> {
        let target = path.to_string();
        self.blocking(path, move |zk| zk.exists(&target, false))
            .await
            .map(|stat| stat.is_some())
    }

    async fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        mode: NodeMode,
    ) -> Result<String, CoordinationError> {
        let target = path.to_string();
        let mode = create_mode(mode);
        self.blocking(path, move |zk| {
            zk.create(&target, data, Acl::open_unsafe().clone(), mode)
        })
        .await
    }

    async fn count_children(&self, path: &str) -> Result<usize, CoordinationError> {
        let target = path.to_string();
        self.blocking(path, move |zk| zk.get_children(&target, false))
            .await
            .map(|children| children.len())
    }

    async fn close(&self) -> Result<(), CoordinationError> {
        self.blocking("/", |zk| zk.close()).await?;
        tracing::info!(endpoint = %self.endpoint, "ZooKeeper session closed");
        Ok(())
    }
}

impl std::fmt::Debug for ZooKeeperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZooKeeperClient")
            .field("endpoint", &self.endpoint)
            .field("session_timeout", &self.session_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_zk_error() {
        let timeout = Duration::from_secs(10);

        assert_eq!(
            map_zk_error("/benchmark", ZkError::NodeExists, timeout),
            CoordinationError::NodeExists("/benchmark".into())
        );
        assert_eq!(
            map_zk_error("/benchmark", ZkError::NoNode, timeout),
            CoordinationError::NoNode("/benchmark".into())
        );
        assert_eq!(
            map_zk_error("/benchmark", ZkError::SessionExpired, timeout),
            CoordinationError::SessionExpired
        );
        assert_eq!(
            map_zk_error("/benchmark", ZkError::OperationTimeout, timeout),
            CoordinationError::Timeout(timeout)
        );
        assert!(map_zk_error("/benchmark", ZkError::ConnectionLoss, timeout).is_retryable());
        assert!(matches!(
            map_zk_error("/benchmark", ZkError::BadVersion, timeout),
            CoordinationError::Remote(_)
        ));
    }

    #[test]
    fn test_create_mode_mapping() {
        assert!(matches!(
            create_mode(NodeMode::Persistent),
            CreateMode::Persistent
        ));
        assert!(matches!(
            create_mode(NodeMode::EphemeralSequential),
            CreateMode::EphemeralSequential
        ));
    }
}
