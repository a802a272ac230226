//! Task inventory for a single job execution.
//!
//! A job runs as two ordered groups of tasks:
//! - **Network tasks**: move data between cluster members (senders, receivers)
//! - **Processing tasks**: run the job's data pipeline locally
//!
//! # Components
//!
//! - [`Task`]: lifecycle hooks (`init`, `destroy`) implemented by every task
//! - [`ExecutionContext`]: owns both task groups in registration order
//!
//! Task membership is fixed once the execution context has been built; the
//! lifecycle processor only ever reads it.

pub mod context;
pub mod task;

pub use context::ExecutionContext;
pub use task::{Task, TaskKind};
