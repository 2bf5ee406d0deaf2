//! zk-bench-core: Concurrency and timing harness for coordination-service benchmarks
//!
//! This crate drives a fixed-size pool of workers that each create
//! sequential ephemeral nodes against one shared session until a common
//! deadline, then reads the number of created nodes back from the service.
//!
//! - Configuration and the immutable run descriptor
//! - The `CoordinationClient` trait consumed by the harness
//! - Worker loop, worker pool with bounded drain, result aggregation
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod run;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod mock;

pub use config::*;
pub use error::*;
pub use orchestrator::{
    DrainOutcome, DrainReport, Orchestrator, OrchestratorBuilder, ResultAggregator, RunReport,
    RunResult, ShutdownHandle, WorkerPool,
};
pub use run::*;
pub use traits::*;
pub use worker::{OperationOutcome, Worker, WorkerBuilder, WorkerStats};
