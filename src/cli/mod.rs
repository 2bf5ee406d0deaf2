//! CLI argument parsing and command handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use zk_bench_clients::Backend;
use zk_bench_core::{BenchmarkConfig, OrchestratorBuilder};

/// zk-bench - Sustained write-throughput benchmark for coordination services
#[derive(Parser, Debug)]
#[command(name = "zk-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file, applied before the flags below
    #[arg(short, long, env = "ZK_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Coordination service address (host:port, comma separated for ensembles)
    #[arg(short, long, env = "ZK_BENCH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Session timeout (e.g. "10s")
    #[arg(long, env = "ZK_BENCH_SESSION_TIMEOUT", value_parser = humantime::parse_duration)]
    pub session_timeout: Option<Duration>,

    /// Root node under which children are created
    #[arg(short, long, env = "ZK_BENCH_ROOT_PATH")]
    pub root_path: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long, env = "ZK_BENCH_WORKERS")]
    pub workers: Option<usize>,

    /// Measurement window (e.g. "10s", "1m")
    #[arg(short, long, env = "ZK_BENCH_DURATION", value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Extra time granted to workers after the window closes
    #[arg(long, env = "ZK_BENCH_DRAIN_GRACE", value_parser = humantime::parse_duration)]
    pub drain_grace: Option<Duration>,

    /// Pause between drain and the count query
    #[arg(long, env = "ZK_BENCH_SETTLE_PAUSE", value_parser = humantime::parse_duration)]
    pub settle_pause: Option<Duration>,

    /// Coordination backend (zookeeper, memory)
    #[arg(short, long, env = "ZK_BENCH_BACKEND", default_value = "zookeeper")]
    pub backend: Backend,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective configuration
    ///
    /// Flags (and their environment variables) win over the config file,
    /// which wins over the defaults. The result is validated.
    pub fn resolve_config(&self) -> Result<BenchmarkConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BenchmarkConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.session_timeout {
            config.session_timeout = timeout;
        }
        if let Some(root_path) = &self.root_path {
            config.root_path = root_path.clone();
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(grace) = self.drain_grace {
            config.drain_grace = grace;
        }
        if let Some(pause) = self.settle_pause {
            config.settle_pause = pause;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Run the benchmark with a resolved configuration
    pub async fn run(&self, config: BenchmarkConfig) -> Result<()> {
        tracing::info!(
            backend = %self.backend,
            endpoint = %config.endpoint,
            workers = config.worker_count,
            duration = %humantime::format_duration(config.duration),
            "Starting zk-bench"
        );

        let client = self
            .backend
            .connect(&config)
            .await
            .with_context(|| format!("Failed to open {} session", self.backend))?;

        let orchestrator = OrchestratorBuilder::new()
            .config(config)
            .client(client)
            .build()
            .context("Failed to build orchestrator")?;

        let report = orchestrator
            .run_with_signal_handling()
            .await
            .context("Benchmark run failed")?;

        if report.drain.stragglers() > 0 {
            tracing::warn!(
                stragglers = report.drain.stragglers(),
                "Count may include nodes created after the drain deadline"
            );
        }

        println!("{}", report.result);
        println!("Done");

        Ok(())
    }
}

fn load_config(path: &Path) -> Result<BenchmarkConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
