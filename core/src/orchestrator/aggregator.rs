//! Result aggregation from the coordination service

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BenchError, BenchResult};
use crate::run::BenchmarkRun;
use crate::traits::CoordinationClient;

/// Outcome of a run
///
/// `ops_per_second` is computed against the nominal window, not the wall
/// time including drain and settle.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Children under the root when counted
    pub total_nodes: usize,

    /// `total_nodes / window` in seconds
    pub ops_per_second: f64,

    /// Nominal measurement window
    pub window: Duration,
}

impl RunResult {
    /// Derive the rate for a count over a window
    pub fn new(total_nodes: usize, window: Duration) -> Self {
        let secs = window.as_secs_f64();
        let ops_per_second = if secs > 0.0 {
            total_nodes as f64 / secs
        } else {
            0.0
        };

        Self {
            total_nodes,
            ops_per_second,
            window,
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total znodes added: {}", self.total_nodes)?;
        write!(f, "Operations per second: {:.2}", self.ops_per_second)
    }
}

/// Reads the measurement back from the service
///
/// Used exactly once per run, after the pool has drained.
pub struct ResultAggregator {
    client: Arc<dyn CoordinationClient>,
    root_path: String,
    window: Duration,
    settle_pause: Duration,
}

impl ResultAggregator {
    /// Create an aggregator for a run
    pub fn new(client: Arc<dyn CoordinationClient>, run: &BenchmarkRun) -> Self {
        Self {
            client,
            root_path: run.root_path.clone(),
            window: run.duration,
            settle_pause: run.settle_pause,
        }
    }

    /// Unconditional pause so just-completed writes become visible
    pub async fn settle(&self) {
        tracing::debug!(
            settle_ms = self.settle_pause.as_millis() as u64,
            "Settling before count"
        );
        tokio::time::sleep(self.settle_pause).await;
    }

    /// Count children under the root and derive the rate
    ///
    /// # Errors
    /// A failed count is fatal to the run.
    pub async fn aggregate(&self) -> BenchResult<RunResult> {
        let total_nodes = self
            .client
            .count_children(&self.root_path)
            .await
            .map_err(|source| BenchError::CountChildren {
                path: self.root_path.clone(),
                source,
            })?;

        Ok(RunResult::new(total_nodes, self.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_count_over_window() {
        let result = RunResult::new(12_345, Duration::from_secs(10));
        assert_eq!(result.ops_per_second, 12_345.0 / 10.0);

        let result = RunResult::new(7, Duration::from_millis(2500));
        assert_eq!(result.ops_per_second, 7.0 / 2.5);
    }

    #[test]
    fn test_rate_zero_count() {
        let result = RunResult::new(0, Duration::from_secs(10));
        assert_eq!(result.total_nodes, 0);
        assert_eq!(result.ops_per_second, 0.0);
    }

    #[test]
    fn test_display_two_lines() {
        let result = RunResult::new(1001, Duration::from_secs(3));
        assert_eq!(
            result.to_string(),
            "Total znodes added: 1001\nOperations per second: 333.67"
        );

        let empty = RunResult::new(0, Duration::from_secs(10));
        assert_eq!(
            empty.to_string(),
            "Total znodes added: 0\nOperations per second: 0.00"
        );
    }
}
