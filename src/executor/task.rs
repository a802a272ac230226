use serde::{Deserialize, Serialize};

use crate::error::BoxError;

/// Which group of the execution context a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Network,
    Processing,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Network => write!(f, "network"),
            TaskKind::Processing => write!(f, "processing"),
        }
    }
}

/// A schedulable unit of a job with lifecycle hooks.
///
/// `init` is called once when execution starts; `destroy` once per terminal
/// event (network tasks only). Both may block. Hooks take `&self` because the
/// execution context is shared read-only, so implementations keep any mutable
/// state behind their own synchronization.
pub trait Task: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    fn init(&self) -> Result<(), BoxError>;

    fn destroy(&self) -> Result<(), BoxError>;
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("name", &self.name()).finish()
    }
}
