//! Orchestrator for run lifecycle management
//!
//! The Orchestrator coordinates one complete benchmark run over a single
//! coordination session:
//! - Ensuring the root node exists before any worker starts
//! - Launching a fixed-size [`WorkerPool`] sharing one deadline
//! - Draining it with a bounded wait (`duration + drain_grace`)
//! - Settling, then counting children once via [`ResultAggregator`]
//!
//! Workers still running when the drain bound expires are not aborted. They
//! may create nodes after the count is taken; the error is bounded by the
//! grace period.
//!
//! # Example
//!
//! ```ignore
//! use zk_bench_core::{BenchmarkConfig, OrchestratorBuilder};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .config(BenchmarkConfig::new(1500))
//!     .client(client)
//!     .build()?;
//!
//! let report = orchestrator.run_with_signal_handling().await?;
//! println!("{}", report.result);
//! ```

mod aggregator;
mod builder;
mod executor;
mod pool;

pub use aggregator::{ResultAggregator, RunResult};
pub use builder::OrchestratorBuilder;
pub use executor::{Orchestrator, RunReport, ShutdownHandle};
pub use pool::{DrainOutcome, DrainReport, RunningPool, WorkerPool};
