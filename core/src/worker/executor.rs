//! Worker execution loop

use crate::run::BenchmarkRun;
use crate::traits::{CoordinationClient, NodeMode};

use super::outcome::OperationOutcome;
use super::stats::WorkerStats;

use std::sync::Arc;
use tokio::sync::watch;

/// Worker issues creates in a loop: check deadline -> create -> repeat
///
/// Workers are independent tokio tasks launched by the
/// [`WorkerPool`](crate::orchestrator::WorkerPool). They share the session
/// and the run descriptor via `Arc` and hold nothing else.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Coordination session (shared across workers via Arc)
    client: Arc<dyn CoordinationClient>,

    /// Run descriptor (shared, immutable)
    run: Arc<BenchmarkRun>,

    /// Shutdown flag, observed at the deadline check
    shutdown: watch::Receiver<bool>,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        client: Arc<dyn CoordinationClient>,
        run: Arc<BenchmarkRun>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            id,
            client,
            run,
            shutdown,
        }
    }

    /// Run the worker loop
    ///
    /// Returns once the deadline has passed (or shutdown was requested) at the
    /// top of an iteration. An in-flight create is always allowed to finish,
    /// so a worker can overrun the window by at most one call latency.
    pub async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::new(self.id);
        stats.start();

        tracing::debug!(worker_id = self.id, "Worker started");

        while !self.should_stop() {
            stats.record_attempt();
            match self.execute_one().await {
                OperationOutcome::Created(path) => {
                    tracing::trace!(worker_id = self.id, path = %path, "Node created");
                }
                OperationOutcome::Failed(e) => {
                    stats.record_failure();
                    tracing::warn!(
                        worker_id = self.id,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Create failed"
                    );
                }
            }

            // Clients may complete without suspending; every worker must get polled
            tokio::task::yield_now().await;
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            attempts = stats.attempts,
            failures = stats.failures,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        stats
    }

    /// Issue exactly one sequential ephemeral create under the root
    async fn execute_one(&self) -> OperationOutcome {
        self.client
            .create(
                &self.run.child_prefix,
                Vec::new(),
                NodeMode::EphemeralSequential,
            )
            .await
            .into()
    }

    /// Re-evaluated before every single operation
    fn should_stop(&self) -> bool {
        self.run.deadline_passed() || *self.shutdown.borrow()
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("backend", &self.client.backend_name())
            .field("child_prefix", &self.run.child_prefix)
            .field("duration", &self.run.duration)
            .finish()
    }
}
