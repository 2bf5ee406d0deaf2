//! In-process coordination service
//!
//! A small hierarchical namespace with the semantics the benchmark relies on:
//! persistent and sequential ephemeral nodes, per-parent sequence counters,
//! and ephemeral cleanup when the session closes. Lets the harness run end to
//! end without a server.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use zk_bench_core::{CoordinationClient, CoordinationError, NodeMode};

#[derive(Debug, Default)]
struct Namespace {
    /// path -> ephemeral
    nodes: BTreeMap<String, bool>,
    /// parent path -> next sequence number
    sequences: HashMap<String, u64>,
}

impl Namespace {
    fn contains(&self, path: &str) -> bool {
        path == "/" || self.nodes.contains_key(path)
    }

    fn children_of<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a String> + 'a {
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };
        let skip = prefix.len();
        self.nodes
            .range(prefix.clone()..)
            .map(|(child, _)| child)
            .take_while(move |child| child.starts_with(&prefix))
            .filter(move |child| !child[skip..].contains('/'))
    }
}

/// Parent of a node path (`/a/b` -> `/a`, `/a` -> `/`)
fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// In-memory coordination session
pub struct MemoryClient {
    endpoint: String,
    delay: Option<Duration>,
    namespace: Mutex<Namespace>,
    closed: AtomicBool,
}

impl MemoryClient {
    /// Create an empty namespace
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            delay: None,
            namespace: Mutex::new(Namespace::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// Add a simulated round-trip latency to every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Simulated call: suspend once, then lock the namespace of an open session
    async fn round_trip(&self) -> Result<MutexGuard<'_, Namespace>, CoordinationError> {
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        let namespace = self.lock()?;
        // Checked under the lock so nothing lands after `close` swept ephemerals
        if self.closed.load(Ordering::Acquire) {
            return Err(CoordinationError::SessionExpired);
        }
        Ok(namespace)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Namespace>, CoordinationError> {
        self.namespace
            .lock()
            .map_err(|_| CoordinationError::Remote("namespace lock poisoned".to_string()))
    }
}

#[async_trait]
impl CoordinationClient for MemoryClient {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exists(&self, path: &str) -> Result<bool, CoordinationError> {
        let namespace = self.round_trip().await?;
        Ok(namespace.contains(path))
    }

    async fn create(
        &self,
        path: &str,
        _data: Vec<u8>,
        mode: NodeMode,
    ) -> Result<String, CoordinationError> {
        let mut namespace = self.round_trip().await?;

        let parent = parent_of(path);
        if !namespace.contains(parent) {
            return Err(CoordinationError::NoNode(parent.to_string()));
        }

        let created = if mode.is_sequential() {
            let next = namespace.sequences.entry(parent.to_string()).or_insert(0);
            let seq = *next;
            *next += 1;
            format!("{path}{seq:010}")
        } else {
            path.to_string()
        };

        if namespace.contains(&created) {
            return Err(CoordinationError::NodeExists(created));
        }

        namespace.nodes.insert(created.clone(), mode.is_ephemeral());
        Ok(created)
    }

    async fn count_children(&self, path: &str) -> Result<usize, CoordinationError> {
        let namespace = self.round_trip().await?;
        if !namespace.contains(path) {
            return Err(CoordinationError::NoNode(path.to_string()));
        }
        Ok(namespace.children_of(path).count())
    }

    async fn close(&self) -> Result<(), CoordinationError> {
        let mut namespace = self.lock()?;
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let before = namespace.nodes.len();
        namespace.nodes.retain(|_, ephemeral| !*ephemeral);

        tracing::debug!(
            removed = before - namespace.nodes.len(),
            "Memory session closed, ephemeral nodes removed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClient")
            .field("endpoint", &self.endpoint)
            .field("delay", &self.delay)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/benchmark"), "/");
        assert_eq!(parent_of("/benchmark/node_"), "/benchmark");
        assert_eq!(parent_of("/a/b/c"), "/a/b");
    }

    #[tokio::test]
    async fn test_persistent_create_and_exists() {
        let client = MemoryClient::new("memory");

        assert!(!client.exists("/benchmark").await.unwrap());
        let created = client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();
        assert_eq!(created, "/benchmark");
        assert!(client.exists("/benchmark").await.unwrap());

        let again = client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await;
        assert!(again.unwrap_err().is_node_exists());
    }

    #[tokio::test]
    async fn test_sequential_suffixes_increase() {
        let client = MemoryClient::new("memory");
        client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();

        let first = client
            .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
            .await
            .unwrap();
        let second = client
            .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
            .await
            .unwrap();

        assert_eq!(first, "/benchmark/node_0000000000");
        assert_eq!(second, "/benchmark/node_0000000001");
        assert!(second > first);
        assert_eq!(client.count_children("/benchmark").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_parent() {
        let client = MemoryClient::new("memory");

        let result = client
            .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
            .await;
        assert_eq!(
            result.unwrap_err(),
            CoordinationError::NoNode("/benchmark".into())
        );
        assert!(client.count_children("/benchmark").await.is_err());
    }

    #[tokio::test]
    async fn test_count_ignores_grandchildren_and_siblings() {
        let client = MemoryClient::new("memory");
        for path in ["/benchmark", "/benchmark/a", "/benchmark/a/deep", "/benchmark2"] {
            client
                .create(path, Vec::new(), NodeMode::Persistent)
                .await
                .unwrap();
        }

        assert_eq!(client.count_children("/benchmark").await.unwrap(), 1);
        assert_eq!(client.count_children("/").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_close_removes_ephemeral_nodes() {
        let client = MemoryClient::new("memory");
        client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();
        client
            .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
            .await
            .unwrap();

        client.close().await.unwrap();

        assert_eq!(
            client.exists("/benchmark").await.unwrap_err(),
            CoordinationError::SessionExpired
        );
        let namespace = client.namespace.lock().unwrap();
        assert_eq!(
            namespace.nodes.keys().cloned().collect::<Vec<_>>(),
            vec!["/benchmark".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_after_close_leaves_nothing() {
        let client = MemoryClient::new("memory");
        client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();
        client.close().await.unwrap();

        let late = client
            .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
            .await;

        assert_eq!(late.unwrap_err(), CoordinationError::SessionExpired);
        assert!(client.close().await.is_ok());
        let namespace = client.namespace.lock().unwrap();
        assert!(namespace.children_of("/benchmark").next().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_closing_under_concurrent_creates_leaves_no_ephemerals() {
        let client = std::sync::Arc::new(MemoryClient::new("memory"));
        client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = std::sync::Arc::clone(&client);
            handles.push(tokio::spawn(async move {
                while client
                    .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
                    .await
                    .is_ok()
                {}
            }));
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        client.close().await.unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        let namespace = client.namespace.lock().unwrap();
        assert!(namespace.nodes.values().all(|ephemeral| !*ephemeral));
    }

    #[tokio::test]
    async fn test_undelayed_call_yields_to_other_tasks() {
        let client = MemoryClient::new("memory");
        let ran = std::sync::Arc::new(AtomicBool::new(false));

        let flag = std::sync::Arc::clone(&ran);
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
        client.exists("/").await.unwrap();

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_unique() {
        let client = std::sync::Arc::new(MemoryClient::new("memory"));
        client
            .create("/benchmark", Vec::new(), NodeMode::Persistent)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let client = std::sync::Arc::clone(&client);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    client
                        .create("/benchmark/node_", Vec::new(), NodeMode::EphemeralSequential)
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(client.count_children("/benchmark").await.unwrap(), 800);
    }
}
