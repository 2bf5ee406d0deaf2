//! Fixed-size worker pool with a bounded drain

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::BenchResult;
use crate::run::BenchmarkRun;
use crate::traits::CoordinationClient;
use crate::worker::{WorkerBuilder, WorkerStats};

/// Launches exactly `run.worker_count` workers over one shared session
///
/// The pool never grows or shrinks: the concurrency level is the quantity
/// under test.
pub struct WorkerPool {
    client: Arc<dyn CoordinationClient>,
    run: Arc<BenchmarkRun>,
    shutdown: watch::Receiver<bool>,
}

impl WorkerPool {
    /// Create a pool for a run
    pub fn new(
        client: Arc<dyn CoordinationClient>,
        run: Arc<BenchmarkRun>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            run,
            shutdown,
        }
    }

    /// Spawn every worker and stop accepting work
    pub fn launch(self) -> BenchResult<RunningPool> {
        let handles = FuturesUnordered::new();

        for worker_id in 0..self.run.worker_count {
            let worker = WorkerBuilder::new(worker_id)
                .client(Arc::clone(&self.client))
                .run(Arc::clone(&self.run))
                .shutdown(self.shutdown.clone())
                .build()?;

            handles.push(tokio::spawn(worker.run()));
        }

        tracing::info!(
            workers = handles.len(),
            duration_ms = self.run.duration.as_millis() as u64,
            "Workers launched"
        );

        Ok(RunningPool {
            launched: handles.len(),
            handles,
            run: self.run,
        })
    }
}

/// Handles of a launched pool, awaiting drain
pub struct RunningPool {
    handles: FuturesUnordered<JoinHandle<WorkerStats>>,
    launched: usize,
    run: Arc<BenchmarkRun>,
}

impl RunningPool {
    /// Number of workers launched
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Wait for workers until the run's drain deadline
    ///
    /// The deadline is `start + duration + drain_grace`.
    pub async fn drain(self) -> DrainReport {
        let deadline = tokio::time::Instant::from_std(self.run.drain_deadline());
        self.drain_until(deadline).await
    }

    /// Wait for workers until `deadline`, then stop waiting
    ///
    /// Workers still running at the deadline are detached, not aborted: they
    /// may keep creating nodes after this returns.
    pub async fn drain_until(mut self, deadline: tokio::time::Instant) -> DrainReport {
        let mut report = DrainReport::new(self.launched);

        let joined = tokio::time::timeout_at(deadline, async {
            while let Some(joined) = self.handles.next().await {
                match joined {
                    Ok(stats) => report.record_finished(&stats),
                    Err(e) => {
                        report.panicked += 1;
                        tracing::error!(error = %e, "Worker task panicked");
                    }
                }
            }
        })
        .await;

        if joined.is_err() {
            let stragglers = self.handles.len();
            report.outcome = DrainOutcome::TimedOut { stragglers };
            tracing::warn!(
                stragglers,
                finished = report.finished,
                "Drain deadline reached; remaining workers are no longer awaited"
            );
        } else {
            tracing::debug!(finished = report.finished, "All workers finished");
        }

        report
    }
}

/// How the drain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every worker finished
    Quiesced,
    /// The bound expired with workers still running
    TimedOut {
        /// Workers not awaited
        stragglers: usize,
    },
}

/// Summary of the drain phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Workers launched
    pub launched: usize,

    /// Workers that returned normally
    pub finished: usize,

    /// Worker tasks that panicked
    pub panicked: usize,

    /// Failed creates across finished workers
    pub failed_operations: usize,

    /// Whether the pool quiesced
    pub outcome: DrainOutcome,
}

impl DrainReport {
    fn new(launched: usize) -> Self {
        Self {
            launched,
            finished: 0,
            panicked: 0,
            failed_operations: 0,
            outcome: DrainOutcome::Quiesced,
        }
    }

    fn record_finished(&mut self, stats: &WorkerStats) {
        self.finished += 1;
        self.failed_operations += stats.failures;
        tracing::debug!(
            worker_id = stats.worker_id,
            failures = stats.failures,
            "Worker completed"
        );
    }

    /// Workers that were still running when the drain gave up
    pub fn stragglers(&self) -> usize {
        match self.outcome {
            DrainOutcome::Quiesced => 0,
            DrainOutcome::TimedOut { stragglers } => stragglers,
        }
    }

    /// Whether every worker finished in time
    pub fn is_quiesced(&self) -> bool {
        self.outcome == DrainOutcome::Quiesced
    }
}
