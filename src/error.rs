use std::fmt;

use thiserror::Error;

use crate::executor::TaskKind;

/// Error type returned by task and listener implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lifecycle hook that raised a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Init,
    Destroy,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPhase::Init => write!(f, "init"),
            TaskPhase::Destroy => write!(f, "destroy"),
        }
    }
}

/// A task's `init()` or `destroy()` failed.
#[derive(Error, Debug)]
#[error("{kind} task {task} failed to {phase}: {source}")]
pub struct TaskError {
    pub task: String,
    pub kind: TaskKind,
    pub phase: TaskPhase,
    #[source]
    pub source: BoxError,
}

/// Why a single listener invocation failed.
#[derive(Debug)]
pub enum ListenerCause {
    Error(BoxError),
    Panic(String),
}

impl fmt::Display for ListenerCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerCause::Error(e) => write!(f, "{}", e),
            ListenerCause::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// One recorded listener failure, tagged with the listener's registration index.
#[derive(Error, Debug)]
#[error("listener #{index} ({listener}) failed: {cause}")]
pub struct ListenerFailure {
    pub index: usize,
    pub listener: String,
    pub cause: ListenerCause,
}

/// Every listener failure from one terminal-event notification pass, in
/// registration order. Never empty.
#[derive(Error, Debug)]
#[error("{} job listener(s) failed: {}", .failures.len(), join(.failures))]
pub struct CombinedListenerError {
    failures: Vec<ListenerFailure>,
}

fn join<E: fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CombinedListenerError {
    /// Returns `None` when there is nothing to report.
    pub fn from_failures(failures: Vec<ListenerFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn failures(&self) -> &[ListenerFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListenerFailure> {
        self.failures.iter()
    }

    pub fn into_failures(self) -> Vec<ListenerFailure> {
        self.failures
    }
}

impl<'a> IntoIterator for &'a CombinedListenerError {
    type Item = &'a ListenerFailure;
    type IntoIter = std::slice::Iter<'a, ListenerFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Listeners(#[from] CombinedListenerError),

    #[error("{} task(s) failed to tear down: {}", .destroy_failures.len(), join(.destroy_failures))]
    Teardown {
        destroy_failures: Vec<TaskError>,
        listener_failures: Option<CombinedListenerError>,
    },
}

impl LifecycleError {
    /// Listener failures carried by this error, if any.
    pub fn listener_failures(&self) -> Option<&CombinedListenerError> {
        match self {
            LifecycleError::Listeners(combined) => Some(combined),
            LifecycleError::Teardown {
                listener_failures, ..
            } => listener_failures.as_ref(),
            LifecycleError::Task(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(index: usize, msg: &str) -> ListenerFailure {
        ListenerFailure {
            index,
            listener: format!("l{}", index),
            cause: ListenerCause::Error(msg.into()),
        }
    }

    #[test]
    fn combined_error_rejects_empty_list() {
        assert!(CombinedListenerError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn combined_error_keeps_order() {
        let combined =
            CombinedListenerError::from_failures(vec![failure(1, "first"), failure(4, "second")])
                .unwrap();
        assert_eq!(combined.len(), 2);
        let indexes: Vec<usize> = combined.iter().map(|f| f.index).collect();
        assert_eq!(indexes, vec![1, 4]);
        assert_eq!(
            combined.to_string(),
            "2 job listener(s) failed: listener #1 (l1) failed: first; listener #4 (l4) failed: second"
        );
    }

    #[test]
    fn task_error_display() {
        let err = TaskError {
            task: "sender-0".to_string(),
            kind: TaskKind::Network,
            phase: TaskPhase::Destroy,
            source: "socket closed".into(),
        };
        assert_eq!(
            err.to_string(),
            "network task sender-0 failed to destroy: socket closed"
        );
    }

    #[test]
    fn panic_cause_display() {
        let cause = ListenerCause::Panic("boom".to_string());
        assert_eq!(cause.to_string(), "panicked: boom");
    }

    #[test]
    fn listener_failures_accessor() {
        let combined = CombinedListenerError::from_failures(vec![failure(0, "x")]).unwrap();
        let err = LifecycleError::Teardown {
            destroy_failures: Vec::new(),
            listener_failures: Some(combined),
        };
        assert_eq!(err.listener_failures().map(|c| c.len()), Some(1));
    }
}
