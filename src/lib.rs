pub mod config;
pub mod error;
pub mod executor;
pub mod job;
pub mod listener;
pub mod processor;
pub mod shutdown;
pub mod simulation;

pub use error::{CombinedListenerError, LifecycleError, ListenerFailure, TaskError};
pub use job::{JobContext, JobEvent, Payload};
pub use processor::{JobEventProcessor, RequestProcessor};
