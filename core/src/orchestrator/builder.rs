//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::CoordinationClient;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .config(config)
///     .client(client)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: BenchmarkConfig,
    client: Option<Arc<dyn CoordinationClient>>,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: BenchmarkConfig::default(),
            client: None,
        }
    }

    /// Set the full benchmark configuration
    pub fn config(mut self, config: BenchmarkConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the worker count
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.config.worker_count = worker_count;
        self
    }

    /// Set the open coordination session
    pub fn client(mut self, client: Arc<dyn CoordinationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<Orchestrator> {
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        Ok(Orchestrator::new(self.config, client))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
