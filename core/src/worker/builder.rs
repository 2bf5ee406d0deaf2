//! Builder pattern for Worker construction

use crate::error::{BenchError, BenchResult};
use crate::run::BenchmarkRun;
use crate::traits::CoordinationClient;

use super::executor::Worker;

use std::sync::Arc;
use tokio::sync::watch;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .client(client)
///     .run(run)
///     .shutdown(shutdown_rx)
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    client: Option<Arc<dyn CoordinationClient>>,
    run: Option<Arc<BenchmarkRun>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            client: None,
            run: None,
            shutdown: None,
        }
    }

    /// Set the coordination session
    pub fn client(mut self, client: Arc<dyn CoordinationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the shared run descriptor
    pub fn run(mut self, run: Arc<BenchmarkRun>) -> Self {
        self.run = Some(run);
        self
    }

    /// Set the shutdown flag receiver
    pub fn shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Build the Worker
    ///
    /// Without a shutdown receiver the worker stops only at the deadline.
    ///
    /// # Errors
    /// Returns an error if the client or run descriptor is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let client = self.client.ok_or(BenchError::missing_config("client"))?;
        let run = self.run.ok_or(BenchError::missing_config("run"))?;
        let shutdown = self.shutdown.unwrap_or_else(|| watch::channel(false).1);

        Ok(Worker::new(self.id, client, run, shutdown))
    }
}
