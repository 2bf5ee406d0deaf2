//! Worker module for issuing benchmark creates
//!
//! A Worker is the unit of concurrent load. Its whole job is one loop:
//! **check deadline -> create one sequential ephemeral node -> repeat**.
//!
//! Workers never talk to each other and never count their successes. The
//! number of nodes that exist under the root afterwards is the measurement;
//! see [`crate::orchestrator::ResultAggregator`].
//!
//! A failed create is turned into an [`OperationOutcome::Failed`], logged and
//! discarded inside the loop. Only the deadline (or an explicit shutdown,
//! checked at the same point) ends a worker.
//!
//! # Example
//!
//! ```ignore
//! use zk_bench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .client(client)
//!     .run(Arc::clone(&run))
//!     .build()?;
//!
//! let stats = worker.run().await;
//! println!("Failed creates: {}", stats.failures);
//! ```

mod builder;
mod executor;
mod outcome;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use outcome::OperationOutcome;
pub use stats::WorkerStats;
