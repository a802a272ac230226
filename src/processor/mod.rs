//! Translates validated job lifecycle events into task and listener side effects.
//!
//! The job state machine decides which transitions are legal; once it has
//! applied one it hands the resulting event to a [`RequestProcessor`]:
//!
//! - `EXECUTION_START`: `init()` every network task, then every processing task
//! - terminal events (`EXECUTION_*` / `INTERRUPTION_*` outcomes): notify every
//!   listener, then `destroy()` every network task
//! - anything else: no-op
//!
//! Task failures propagate immediately. Listener failures are collected and
//! reported as one [`CombinedListenerError`](crate::error::CombinedListenerError)
//! after teardown has run.

mod request;
mod teardown;

pub use request::JobEventProcessor;

use crate::error::Result;
use crate::job::Payload;

/// Applies the side effects of one already-validated lifecycle event.
pub trait RequestProcessor<E> {
    fn process_request(&self, event: E, payload: &Payload) -> Result<()>;
}
