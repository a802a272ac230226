use std::sync::Arc;

use uuid::Uuid;

use crate::config::TeardownPolicy;
use crate::error::{TaskError, TaskPhase};
use crate::executor::{Task, TaskKind};

/// Destroys network tasks exactly once, either explicitly through
/// [`TeardownGuard::finish`] or from `Drop` if the notification step unwinds.
pub(crate) struct TeardownGuard<'a> {
    job_id: Uuid,
    tasks: &'a [Arc<dyn Task>],
    policy: TeardownPolicy,
    armed: bool,
}

impl<'a> TeardownGuard<'a> {
    pub(crate) fn arm(job_id: Uuid, tasks: &'a [Arc<dyn Task>], policy: TeardownPolicy) -> Self {
        Self {
            job_id,
            tasks,
            policy,
            armed: true,
        }
    }

    /// Run teardown now and return the destroy failures.
    pub(crate) fn finish(mut self) -> Vec<TaskError> {
        self.armed = false;
        destroy_all(self.job_id, self.tasks, self.policy)
    }
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        tracing::warn!(
            job_id = %self.job_id,
            tasks = self.tasks.len(),
            "Listener notification unwound, tearing down network tasks"
        );
        // Nothing can be returned while unwinding, so failures are only logged.
        for failure in destroy_all(self.job_id, self.tasks, self.policy) {
            tracing::error!(job_id = %self.job_id, error = %failure, "Teardown failed during unwind");
        }
    }
}

pub(crate) fn destroy_all(
    job_id: Uuid,
    tasks: &[Arc<dyn Task>],
    policy: TeardownPolicy,
) -> Vec<TaskError> {
    let mut failures = Vec::new();

    for task in tasks {
        tracing::debug!(job_id = %job_id, task = task.name(), "Destroying network task");
        if let Err(source) = task.destroy() {
            tracing::error!(
                job_id = %job_id,
                task = task.name(),
                error = %source,
                "Network task destroy failed"
            );
            failures.push(TaskError {
                task: task.name().to_string(),
                kind: TaskKind::Network,
                phase: TaskPhase::Destroy,
                source,
            });
            if policy == TeardownPolicy::FailFast {
                break;
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::error::BoxError;

    struct Probe {
        name: String,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Task for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(&self) -> Result<(), BoxError> {
            Ok(())
        }

        fn destroy(&self) -> Result<(), BoxError> {
            self.log.lock().unwrap().push(self.name.clone());
            if self.fail {
                Err("teardown refused".into())
            } else {
                Ok(())
            }
        }
    }

    fn tasks(failing: &[usize], log: &Arc<Mutex<Vec<String>>>) -> Vec<Arc<dyn Task>> {
        (0..3)
            .map(|i| {
                Arc::new(Probe {
                    name: format!("n{}", i),
                    fail: failing.contains(&i),
                    log: log.clone(),
                }) as Arc<dyn Task>
            })
            .collect()
    }

    #[test]
    fn finish_destroys_each_task_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = tasks(&[], &log);

        let guard = TeardownGuard::arm(Uuid::new_v4(), &tasks, TeardownPolicy::CollectAll);
        assert!(guard.finish().is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["n0", "n1", "n2"]);
    }

    #[test]
    fn drop_destroys_when_not_finished() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = tasks(&[1], &log);

        drop(TeardownGuard::arm(
            Uuid::new_v4(),
            &tasks,
            TeardownPolicy::CollectAll,
        ));
        assert_eq!(*log.lock().unwrap(), vec!["n0", "n1", "n2"]);
    }

    #[test]
    fn collect_all_keeps_going_after_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = tasks(&[0, 2], &log);

        let failures = destroy_all(Uuid::new_v4(), &tasks, TeardownPolicy::CollectAll);
        let failed: Vec<&str> = failures.iter().map(|f| f.task.as_str()).collect();
        assert_eq!(failed, vec!["n0", "n2"]);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = tasks(&[0, 2], &log);

        let failures = destroy_all(Uuid::new_v4(), &tasks, TeardownPolicy::FailFast);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].phase, TaskPhase::Destroy);
        assert_eq!(*log.lock().unwrap(), vec!["n0"]);
    }
}
