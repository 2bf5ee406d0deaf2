//! zk-bench CLI
//!
//! Runs a fixed pool of workers creating sequential ephemeral nodes against
//! one coordination session, then reports how many were created.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize logging; stdout carries only the result lines
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.resolve_config()?;

    let blocking_threads = cli.backend.blocking_threads(config.worker_count);
    tracing::debug!(blocking_threads, "Sizing blocking pool");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(blocking_threads)
        .build()
        .context("Failed to build tokio runtime")?;

    let drain_grace = config.drain_grace;
    let result = runtime.block_on(cli.run(config));

    // Detached stragglers are not awaited past the grace period
    runtime.shutdown_timeout(drain_grace.max(Duration::from_secs(1)));

    result
}
