use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ProcessorConfig;
use crate::error::{
    CombinedListenerError, LifecycleError, ListenerCause, ListenerFailure, Result, TaskError,
    TaskPhase,
};
use crate::executor::TaskKind;
use crate::job::{EventCategory, JobContext, JobEvent, Payload};
use crate::processor::teardown::TeardownGuard;
use crate::processor::RequestProcessor;

/// Lifecycle processor for one job.
///
/// Stateless apart from the shared job context: each call runs synchronously
/// on the caller's thread and blocks until every hook it triggers returns.
/// Calls against the same job must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct JobEventProcessor {
    context: Arc<JobContext>,
    config: ProcessorConfig,
}

impl JobEventProcessor {
    pub fn new(context: Arc<JobContext>) -> Self {
        Self::with_config(context, ProcessorConfig::default())
    }

    pub fn with_config(context: Arc<JobContext>, config: ProcessorConfig) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &Arc<JobContext> {
        &self.context
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Initialize network tasks, then processing tasks. The first failure is
    /// returned as-is; already-initialized tasks are left for the caller.
    fn start(&self) -> Result<()> {
        let execution = self.context.execution_context();
        for kind in [TaskKind::Network, TaskKind::Processing] {
            for task in execution.tasks(kind) {
                tracing::debug!(job_id = %self.context.id(), task = task.name(), %kind, "Initializing task");
                task.init().map_err(|source| {
                    tracing::error!(
                        job_id = %self.context.id(),
                        task = task.name(),
                        %kind,
                        error = %source,
                        "Task init failed"
                    );
                    TaskError {
                        task: task.name().to_string(),
                        kind,
                        phase: TaskPhase::Init,
                        source,
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Notify every listener, then tear down network tasks.
    fn complete(&self, event: JobEvent) -> Result<()> {
        let guard = TeardownGuard::arm(
            self.context.id(),
            self.context.execution_context().network_tasks(),
            self.config.teardown_policy,
        );
        let failures = self.notify_listeners(event);
        let destroy_failures = guard.finish();

        let listener_failures = CombinedListenerError::from_failures(failures);
        if !destroy_failures.is_empty() {
            return Err(LifecycleError::Teardown {
                destroy_failures,
                listener_failures,
            });
        }
        match listener_failures {
            Some(combined) => Err(combined.into()),
            None => Ok(()),
        }
    }

    fn notify_listeners(&self, event: JobEvent) -> Vec<ListenerFailure> {
        let ctx = self.context.as_ref();
        let mut failures = Vec::new();

        for (index, listener) in ctx.listeners().iter().enumerate() {
            let started = Instant::now();
            let outcome = if self.config.catch_listener_panics {
                panic::catch_unwind(AssertUnwindSafe(|| listener.on_job_executed(ctx)))
                    .unwrap_or_else(|panic| Err(PanicMarker(panic_message(panic)).into()))
            } else {
                listener.on_job_executed(ctx)
            };

            let elapsed = started.elapsed();
            if elapsed > self.config.slow_listener_threshold {
                tracing::warn!(
                    job_id = %ctx.id(),
                    listener = listener.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Slow job listener"
                );
            }

            if let Err(err) = outcome {
                tracing::warn!(
                    job_id = %ctx.id(),
                    %event,
                    listener = listener.name(),
                    index,
                    error = %err,
                    "Job listener failed"
                );
                let cause = match err.downcast::<PanicMarker>() {
                    Ok(marker) => ListenerCause::Panic(marker.0),
                    Err(err) => ListenerCause::Error(err),
                };
                failures.push(ListenerFailure {
                    index,
                    listener: listener.name().to_string(),
                    cause,
                });
            }
        }

        failures
    }
}

impl RequestProcessor<JobEvent> for JobEventProcessor {
    fn process_request(&self, event: JobEvent, payload: &Payload) -> Result<()> {
        let job_id = self.context.id();
        match event.category() {
            EventCategory::Start => {
                tracing::info!(
                    job_id = %job_id,
                    %event,
                    tasks = self.context.execution_context().task_count(),
                    "Starting job tasks"
                );
                self.start()
            }
            EventCategory::Terminal => {
                tracing::info!(
                    job_id = %job_id,
                    %event,
                    listeners = self.context.listeners().len(),
                    has_payload = !payload.is_empty(),
                    "Completing job"
                );
                self.complete(event)
            }
            EventCategory::Passive => {
                tracing::debug!(job_id = %job_id, %event, "No lifecycle side effects for event");
                Ok(())
            }
        }
    }
}

/// Carries a caught panic message through the listener error path.
#[derive(Debug)]
struct PanicMarker(String);

impl std::fmt::Display for PanicMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panicked: {}", self.0)
    }
}

impl std::error::Error for PanicMarker {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::error::BoxError;
    use crate::executor::{ExecutionContext, Task};
    use crate::listener::listener_fn;

    struct Recorded {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Task for Recorded {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(&self) -> std::result::Result<(), BoxError> {
            self.log.lock().unwrap().push(format!("{}.init", self.name));
            Ok(())
        }

        fn destroy(&self) -> std::result::Result<(), BoxError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}.destroy", self.name));
            Ok(())
        }
    }

    fn context(log: &Arc<Mutex<Vec<String>>>) -> JobContext {
        let task = |name: &str| -> Arc<dyn Task> {
            Arc::new(Recorded {
                name: name.to_string(),
                log: log.clone(),
            })
        };
        JobContext::new(
            "unit",
            ExecutionContext::new()
                .with_network_task(task("n1"))
                .with_processing_task(task("p1")),
        )
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(7u8)), "non-string panic payload");
    }

    #[test]
    fn caught_panic_becomes_listener_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ctx = context(&log).with_listener(Arc::new(listener_fn("explodes", |_| {
            panic!("listener bug")
        })));
        let processor = JobEventProcessor::new(Arc::new(ctx));

        let err = processor
            .process_request(JobEvent::ExecutionSuccess, &Payload::none())
            .unwrap_err();
        let combined = err.listener_failures().unwrap();
        assert_eq!(combined.len(), 1);
        assert!(matches!(
            &combined.failures()[0].cause,
            ListenerCause::Panic(msg) if msg == "listener bug"
        ));
        assert_eq!(*log.lock().unwrap(), vec!["n1.destroy"]);
    }

    #[test]
    fn uncaught_panic_still_tears_down() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ctx = context(&log).with_listener(Arc::new(listener_fn("explodes", |_| {
            panic!("listener bug")
        })));
        let processor = JobEventProcessor::with_config(
            Arc::new(ctx),
            ProcessorConfig::default().with_catch_listener_panics(false),
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            processor.process_request(JobEvent::InterruptionFailure, &Payload::none())
        }));
        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["n1.destroy"]);
    }

    #[test]
    fn slow_listener_does_not_fail() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ctx = context(&log).with_listener(Arc::new(listener_fn("slow", |_| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(())
        })));
        let processor = JobEventProcessor::with_config(
            Arc::new(ctx),
            ProcessorConfig::default().with_slow_listener_threshold(Duration::from_millis(1)),
        );

        assert!(processor
            .process_request(JobEvent::ExecutionSuccess, &Payload::none())
            .is_ok());
    }

    #[test]
    fn start_does_not_destroy() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let processor = JobEventProcessor::new(Arc::new(context(&log)));

        processor
            .process_request(JobEvent::ExecutionStart, &Payload::none())
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["n1.init", "p1.init"]);
    }
}
