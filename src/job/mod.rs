pub mod context;
pub mod event;
pub mod payload;

pub use context::JobContext;
pub use event::{EventCategory, JobEvent, UnknownJobEvent};
pub use payload::Payload;
