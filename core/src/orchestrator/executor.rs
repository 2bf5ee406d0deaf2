//! Orchestrator execution logic

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::run::{BenchmarkRun, RunTimeline};
use crate::traits::{CoordinationClient, NodeMode};

use super::aggregator::{ResultAggregator, RunResult};
use super::pool::{DrainReport, WorkerPool};

/// Orchestrator drives one run over one open session
///
/// `run` consumes the orchestrator: once the session is closed no further
/// operation is valid.
pub struct Orchestrator {
    /// Validated benchmark configuration
    pub(crate) config: BenchmarkConfig,

    /// Coordination session (shared with every worker)
    pub(crate) client: Arc<dyn CoordinationClient>,

    /// Shutdown flag sender
    pub(crate) shutdown_tx: Arc<watch::Sender<bool>>,
}

/// Requests an early stop
///
/// Workers observe the flag at their deadline check; calls already in flight
/// are never interrupted.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask every worker to stop before its next create
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown was requested
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Count and rate
    pub result: RunResult,

    /// How the pool drained
    pub drain: DrainReport,

    /// State transitions with their instants
    pub timeline: RunTimeline,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a validated construction.
    pub fn new(config: BenchmarkConfig, client: Arc<dyn CoordinationClient>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            client,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Get a handle that can stop workers early
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Get the benchmark configuration
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the benchmark
    ///
    /// Ensures the root, runs the pool for the window, drains (bounded),
    /// settles, counts, then closes the session. The session is closed on the
    /// error path too, best-effort.
    pub async fn run(self) -> BenchResult<RunReport> {
        let mut timeline = RunTimeline::new();

        tracing::info!(
            backend = self.client.backend_name(),
            endpoint = self.client.endpoint(),
            root_path = %self.config.root_path,
            workers = self.config.worker_count,
            duration = ?self.config.duration,
            drain_timeout = ?self.config.drain_timeout(),
            "Starting benchmark run"
        );

        let outcome = self.execute(&mut timeline).await;
        self.close_session().await;

        let (result, drain) = outcome?;
        timeline.advance();

        tracing::info!(
            total_nodes = result.total_nodes,
            ops_per_second = result.ops_per_second,
            failed_operations = drain.failed_operations,
            stragglers = drain.stragglers(),
            "Benchmark run completed"
        );

        Ok(RunReport {
            result,
            drain,
            timeline,
        })
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C stops workers early; the count is still taken and the rate is
    /// still reported against the nominal window.
    pub async fn run_with_signal_handling(self) -> BenchResult<RunReport> {
        let shutdown = self.shutdown_handle();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, stopping workers at their next check");
                    shutdown.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;

        signal_handle.abort();

        result
    }

    async fn execute(&self, timeline: &mut RunTimeline) -> BenchResult<(RunResult, DrainReport)> {
        self.ensure_root().await?;
        timeline.advance();

        let run = Arc::new(BenchmarkRun::start(&self.config));
        let pool = WorkerPool::new(
            Arc::clone(&self.client),
            Arc::clone(&run),
            self.shutdown_tx.subscribe(),
        )
        .launch()?;
        timeline.advance();

        let drain = pool.drain().await;
        timeline.advance();

        let aggregator = ResultAggregator::new(Arc::clone(&self.client), &run);
        timeline.advance();
        aggregator.settle().await;

        let result = aggregator.aggregate().await?;
        timeline.advance();

        Ok((result, drain))
    }

    /// Create the root node unless it already exists
    ///
    /// Losing a creation race to another session counts as success.
    async fn ensure_root(&self) -> BenchResult<()> {
        let path = self.config.root_path.as_str();
        let root_error = |source| BenchError::EnsureRoot {
            path: path.to_string(),
            source,
        };

        if self.client.exists(path).await.map_err(root_error)? {
            tracing::debug!(root_path = path, "Root node already exists");
            return Ok(());
        }

        match self.client.create(path, Vec::new(), NodeMode::Persistent).await {
            Ok(created) => {
                tracing::info!(root_path = %created, "Created root node");
                Ok(())
            }
            Err(e) if e.is_node_exists() => {
                tracing::debug!(root_path = path, "Root node created concurrently");
                Ok(())
            }
            Err(e) => Err(root_error(e)),
        }
    }

    async fn close_session(&self) {
        if let Err(e) = self.client.close().await {
            tracing::warn!(error = %e, "Failed to close session cleanly");
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("backend", &self.client.backend_name())
            .field("endpoint", &self.client.endpoint())
            .finish()
    }
}
