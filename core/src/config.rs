//! Benchmark configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted value for any configured duration (30 days)
///
/// Keeps every deadline derived from a run's start instant representable.
pub const MAX_CONFIG_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Benchmark configuration
///
/// Every recognized option of a run. Durations serialize as human-readable
/// strings (`"10s"`, `"250ms"`). Fields missing from a config file fall back
/// to [`BenchmarkConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Coordination service address (`host:port`, comma separated for ensembles)
    pub endpoint: String,

    /// Session timeout negotiated with the service
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,

    /// Root node under which benchmark children are created
    pub root_path: String,

    /// Number of concurrent workers
    pub worker_count: usize,

    /// Measurement window
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Extra time granted to stragglers after the window closes
    #[serde(with = "humantime_serde")]
    pub drain_grace: Duration,

    /// Pause between drain and the count query
    #[serde(with = "humantime_serde")]
    pub settle_pause: Duration,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:2181".to_string(),
            session_timeout: Duration::from_secs(10),
            root_path: "/benchmark".to_string(),
            worker_count: 1500,
            duration: Duration::from_secs(10),
            drain_grace: Duration::from_secs(5),
            settle_pause: Duration::from_secs(1),
        }
    }
}

impl BenchmarkConfig {
    /// Create a new config with the given worker count
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Default::default()
        }
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the session timeout
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Set the root path
    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    /// Set the worker count
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the measurement window
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the drain grace period
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Set the settle pause
    pub fn with_settle_pause(mut self, pause: Duration) -> Self {
        self.settle_pause = pause;
        self
    }

    /// Path prefix handed to every sequential create
    pub fn child_prefix(&self) -> String {
        format!("{}/node_", self.root_path)
    }

    /// Upper bound the pool waits for workers, measured from run start
    pub fn drain_timeout(&self) -> Duration {
        self.duration.saturating_add(self.drain_grace)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        if self.session_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "session timeout must be positive".into(),
            ));
        }

        if !self.root_path.starts_with('/') {
            return Err(ConfigError::InvalidRootPath(format!(
                "{:?} is not absolute",
                self.root_path
            )));
        }
        if self.root_path == "/" || self.root_path.ends_with('/') {
            return Err(ConfigError::InvalidRootPath(format!(
                "{:?} must name a node below / without a trailing slash",
                self.root_path
            )));
        }

        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(
                "worker count must be at least 1".into(),
            ));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "duration must be positive".into(),
            ));
        }

        if self.session_timeout > MAX_CONFIG_DURATION {
            return Err(ConfigError::InvalidTimeout(format!(
                "session timeout {:?} exceeds {:?}",
                self.session_timeout, MAX_CONFIG_DURATION
            )));
        }
        for (name, value) in [
            ("duration", self.duration),
            ("drain grace", self.drain_grace),
            ("settle pause", self.settle_pause),
        ] {
            if value > MAX_CONFIG_DURATION {
                return Err(ConfigError::InvalidDuration(format!(
                    "{name} {value:?} exceeds {MAX_CONFIG_DURATION:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Endpoint is empty
    #[error("endpoint must not be empty")]
    MissingEndpoint,

    /// Invalid timeout value
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Root path is not a usable absolute node path
    #[error("Invalid root path: {0}")]
    InvalidRootPath(String),

    /// Invalid worker count
    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(String),

    /// Invalid measurement window
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}
