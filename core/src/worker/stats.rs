//! Worker statistics tracking

use std::time::{Duration, Instant};

/// Diagnostics kept by each worker
///
/// Attempts and failures are counted for logs only. How many creates
/// succeeded is read back from the service once the pool has drained.
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Worker that produced these stats
    pub worker_id: usize,

    /// Number of creates issued
    pub attempts: usize,

    /// Number of creates that failed or were interrupted
    pub failures: usize,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats for a worker
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Record a create about to be issued
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Record a failed create
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }
}
