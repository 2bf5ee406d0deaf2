//! Coordination client implementations for zk-bench
//!
//! This crate provides implementations of the `CoordinationClient` trait:
//!
//! - ZooKeeper (a real ensemble, via the `zookeeper` crate)
//! - Memory (an in-process namespace for smoke runs and tests)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;
mod zk;

pub use memory::MemoryClient;
pub use zk::ZooKeeperClient;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zk_bench_core::{BenchError, BenchResult, BenchmarkConfig, CoordinationClient};

/// Blocking-pool threads beyond one per worker (session setup, count, close)
const BLOCKING_THREAD_SLACK: usize = 16;

/// Blocking-pool size for backends that never block (tokio's default)
const DEFAULT_BLOCKING_THREADS: usize = 512;

/// Enumeration of supported coordination backends
///
/// Used for CLI parsing and client factory dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Apache ZooKeeper
    #[serde(rename = "zookeeper")]
    ZooKeeper,
    /// In-process namespace
    #[serde(rename = "memory")]
    Memory,
}

impl Backend {
    /// Returns the identifier string for this backend.
    pub fn id(&self) -> &'static str {
        match self {
            Backend::ZooKeeper => "zookeeper",
            Backend::Memory => "memory",
        }
    }

    /// Returns all supported backends.
    pub fn all() -> &'static [Backend] {
        &[Backend::ZooKeeper, Backend::Memory]
    }

    /// Blocking-pool size a run with `worker_count` workers needs
    ///
    /// The ZooKeeper client parks one OS thread per in-flight call, so it
    /// needs one thread per worker plus slack. The memory backend never blocks.
    pub fn blocking_threads(&self, worker_count: usize) -> usize {
        match self {
            Backend::ZooKeeper => worker_count.saturating_add(BLOCKING_THREAD_SLACK),
            Backend::Memory => DEFAULT_BLOCKING_THREADS,
        }
    }

    /// Open one session for a run
    ///
    /// # Errors
    /// A session that cannot be opened is fatal to the run.
    pub async fn connect(&self, config: &BenchmarkConfig) -> BenchResult<Arc<dyn CoordinationClient>> {
        match self {
            Backend::ZooKeeper => {
                let client = ZooKeeperClient::connect(&config.endpoint, config.session_timeout)
                    .await
                    .map_err(|e| BenchError::connect(&config.endpoint, e))?;
                Ok(Arc::new(client))
            }
            Backend::Memory => Ok(Arc::new(MemoryClient::new(&config.endpoint))),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::ZooKeeper
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::all()
            .iter()
            .copied()
            .find(|backend| backend.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown backend {s:?} (expected one of: {})",
                    Backend::all()
                        .iter()
                        .map(|b| b.id())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("zookeeper".parse::<Backend>(), Ok(Backend::ZooKeeper));
        assert_eq!("Memory".parse::<Backend>(), Ok(Backend::Memory));

        let err = "etcd".parse::<Backend>().unwrap_err();
        assert!(err.contains("zookeeper, memory"));
    }

    #[test]
    fn test_backend_display_roundtrip() {
        for backend in Backend::all() {
            assert_eq!(backend.to_string().parse::<Backend>().as_ref(), Ok(backend));
        }
        assert_eq!(Backend::default(), Backend::ZooKeeper);
    }

    #[test]
    fn test_blocking_threads() {
        assert_eq!(Backend::ZooKeeper.blocking_threads(1500), 1516);
        assert_eq!(Backend::ZooKeeper.blocking_threads(usize::MAX), usize::MAX);
        assert_eq!(Backend::Memory.blocking_threads(1500), 512);
    }

    #[tokio::test]
    async fn test_memory_backend_connects() {
        let config = BenchmarkConfig::new(1).with_endpoint("local");
        let client = Backend::Memory.connect(&config).await.unwrap();

        assert_eq!(client.backend_name(), "memory");
        assert_eq!(client.endpoint(), "local");
    }
}
