//! Spawn abstraction and background worker supervisor for the gateway.
//!
//! This crate provides the [`Executor`] trait the background workers run
//! on (token rotation sweep, key rotation, threat cleanup, rate-limit
//! bucket GC) and the [`WorkerSupervisor`] that registers, cancels, and
//! joins them as a group during shutdown.
//!
//! # Example
//!
//! ```rust
//! use toolgate_executor::{CurrentRuntime, WorkerSupervisor};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let supervisor = WorkerSupervisor::new();
//! let executor = CurrentRuntime::new();
//!
//! supervisor.spawn_periodic(&executor, "rate-limit-gc", Duration::from_secs(60), || async {
//!     // reclaim idle tenant buckets
//! });
//!
//! supervisor.shutdown(Duration::from_secs(5)).await;
//! # }
//! ```

mod executor;
mod supervisor;

pub use executor::{BlockingExecutor, CurrentRuntime, Executor};
pub use supervisor::WorkerSupervisor;
