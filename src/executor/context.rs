use std::sync::Arc;

use crate::executor::task::{Task, TaskKind};

/// Owns the network and processing tasks of one job execution.
#[derive(Debug, Default, Clone)]
pub struct ExecutionContext {
    network_tasks: Vec<Arc<dyn Task>>,
    processing_tasks: Vec<Arc<dyn Task>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a network task; tasks run their hooks in insertion order.
    pub fn add_network_task(&mut self, task: Arc<dyn Task>) {
        tracing::debug!(task = task.name(), "Network task registered");
        self.network_tasks.push(task);
    }

    /// Append a processing task; tasks run their hooks in insertion order.
    pub fn add_processing_task(&mut self, task: Arc<dyn Task>) {
        tracing::debug!(task = task.name(), "Processing task registered");
        self.processing_tasks.push(task);
    }

    pub fn with_network_task(mut self, task: Arc<dyn Task>) -> Self {
        self.add_network_task(task);
        self
    }

    pub fn with_processing_task(mut self, task: Arc<dyn Task>) -> Self {
        self.add_processing_task(task);
        self
    }

    pub fn network_tasks(&self) -> &[Arc<dyn Task>] {
        &self.network_tasks
    }

    pub fn processing_tasks(&self) -> &[Arc<dyn Task>] {
        &self.processing_tasks
    }

    pub fn tasks(&self, kind: TaskKind) -> &[Arc<dyn Task>] {
        match kind {
            TaskKind::Network => &self.network_tasks,
            TaskKind::Processing => &self.processing_tasks,
        }
    }

    pub fn task_count(&self) -> usize {
        self.network_tasks.len() + self.processing_tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    struct Noop(&'static str);

    impl Task for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn init(&self) -> Result<(), BoxError> {
            Ok(())
        }

        fn destroy(&self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn tasks_keep_registration_order() {
        let ctx = ExecutionContext::new()
            .with_network_task(Arc::new(Noop("n1")))
            .with_processing_task(Arc::new(Noop("p1")))
            .with_network_task(Arc::new(Noop("n2")));

        let network: Vec<&str> = ctx.network_tasks().iter().map(|t| t.name()).collect();
        assert_eq!(network, vec!["n1", "n2"]);
        assert_eq!(ctx.tasks(TaskKind::Processing).len(), 1);
        assert_eq!(ctx.task_count(), 3);
    }

    #[test]
    fn empty_context() {
        let ctx = ExecutionContext::default();
        assert!(ctx.network_tasks().is_empty());
        assert!(ctx.processing_tasks().is_empty());
        assert_eq!(ctx.task_count(), 0);
    }
}
