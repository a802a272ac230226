use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::executor::ExecutionContext;
use crate::listener::JobListener;

/// Per-job aggregate of execution resources and observers.
///
/// Listeners are registered while the context is still owned by the job
/// setup code. Once wrapped in an `Arc` and handed to the processor the
/// context no longer changes, so the listener list iterated during a
/// notification pass is a stable snapshot.
#[derive(Debug)]
pub struct JobContext {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    execution: ExecutionContext,
    listeners: Vec<Arc<dyn JobListener>>,
}

impl JobContext {
    pub fn new(name: impl Into<String>, execution: ExecutionContext) -> Self {
        Self::with_id(Uuid::new_v4(), name, execution)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>, execution: ExecutionContext) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
            execution,
            listeners: Vec::new(),
        }
    }

    pub fn register_listener(&mut self, listener: Arc<dyn JobListener>) {
        tracing::debug!(job_id = %self.id, listener = listener.name(), "Job listener registered");
        self.listeners.push(listener);
    }

    pub fn with_listener(mut self, listener: Arc<dyn JobListener>) -> Self {
        self.register_listener(listener);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn execution_context(&self) -> &ExecutionContext {
        &self.execution
    }

    pub fn listeners(&self) -> &[Arc<dyn JobListener>] {
        &self.listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener_fn;

    #[test]
    fn listeners_keep_registration_order() {
        let ctx = JobContext::new("word-count", ExecutionContext::new())
            .with_listener(Arc::new(listener_fn("audit", |_| Ok(()))))
            .with_listener(Arc::new(listener_fn("metrics", |_| Ok(()))));

        let names: Vec<&str> = ctx.listeners().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["audit", "metrics"]);
        assert_eq!(ctx.name(), "word-count");
    }

    #[test]
    fn with_id_keeps_id() {
        let id = Uuid::new_v4();
        let ctx = JobContext::with_id(id, "job", ExecutionContext::new());
        assert_eq!(ctx.id(), id);
        assert!(ctx.listeners().is_empty());
        assert!(ctx.created_at() <= Utc::now());
    }
}
