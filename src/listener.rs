use crate::error::BoxError;
use crate::job::JobContext;

/// Observer notified when a job's execution or interruption concludes.
///
/// Called at most once per terminal event, on the thread applying the
/// transition. A returned error (or a panic, when the processor is configured
/// to catch them) is recorded and never stops the remaining listeners.
pub trait JobListener: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn on_job_executed(&self, ctx: &JobContext) -> Result<(), BoxError>;
}

impl std::fmt::Debug for dyn JobListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobListener")
            .field("name", &self.name())
            .finish()
    }
}

/// A closure registered as a listener.
pub struct FnListener<F> {
    name: String,
    callback: F,
}

impl<F> JobListener for FnListener<F>
where
    F: Fn(&JobContext) -> Result<(), BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_job_executed(&self, ctx: &JobContext) -> Result<(), BoxError> {
        (self.callback)(ctx)
    }
}

pub fn listener_fn<F>(name: impl Into<String>, callback: F) -> FnListener<F>
where
    F: Fn(&JobContext) -> Result<(), BoxError> + Send + Sync,
{
    FnListener {
        name: name.into(),
        callback,
    }
}
