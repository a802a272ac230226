//! Drives one simulated job through its lifecycle.
//!
//! Tasks and listeners here do no real work: they append to a shared journal
//! and fail on demand, which makes the processor's ordering and isolation
//! behaviour visible from the command line.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::error::{BoxError, LifecycleError};
use crate::executor::{ExecutionContext, Task, TaskKind};
use crate::job::{JobContext, JobEvent, Payload};
use crate::listener::JobListener;
use crate::processor::{JobEventProcessor, RequestProcessor};

#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
}

/// Append-only record of every hook invocation, shared by all simulated parts.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<JournalEntry>>>);

impl Journal {
    pub fn record(&self, actor: &str, action: &str) {
        let entry = JournalEntry {
            at: Utc::now(),
            actor: actor.to_string(),
            action: action.to_string(),
        };
        // A poisoned journal only means a listener panicked mid-record.
        let mut entries = self.0.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

pub struct SimulatedTask {
    name: String,
    fail_init: bool,
    fail_destroy: bool,
    journal: Journal,
}

impl Task for SimulatedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self) -> Result<(), BoxError> {
        self.journal.record(&self.name, "init");
        if self.fail_init {
            return Err(format!("{} could not allocate its buffers", self.name).into());
        }
        Ok(())
    }

    fn destroy(&self) -> Result<(), BoxError> {
        self.journal.record(&self.name, "destroy");
        if self.fail_destroy {
            return Err(format!("{} did not release its connection", self.name).into());
        }
        Ok(())
    }
}

pub struct SimulatedListener {
    name: String,
    fail: bool,
    journal: Journal,
}

impl JobListener for SimulatedListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_job_executed(&self, ctx: &JobContext) -> Result<(), BoxError> {
        self.journal.record(&self.name, "on_job_executed");
        if self.fail {
            return Err(format!("{} rejected completion of job {}", self.name, ctx.id()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationOutcome {
    Completed,
    Interrupted,
    StartFailed,
}

impl std::fmt::Display for SimulationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationOutcome::Completed => write!(f, "completed"),
            SimulationOutcome::Interrupted => write!(f, "interrupted"),
            SimulationOutcome::StartFailed => write!(f, "start failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub job_id: Uuid,
    pub job_name: String,
    pub outcome: SimulationOutcome,
    pub terminal_event: JobEvent,
    pub errors: Vec<String>,
    pub journal: Vec<JournalEntry>,
}

/// Build the job context described by `config`, recording into `journal`.
pub fn build_context(config: &SimulationConfig, journal: &Journal) -> JobContext {
    let task = |kind: TaskKind, index: usize| -> Arc<dyn Task> {
        let prefix = match kind {
            TaskKind::Network => "network",
            TaskKind::Processing => "processing",
        };
        Arc::new(SimulatedTask {
            name: format!("{}-{}", prefix, index),
            fail_init: kind == TaskKind::Processing && config.failing_init == Some(index),
            fail_destroy: kind == TaskKind::Network && config.failing_destroys.contains(&index),
            journal: journal.clone(),
        })
    };

    let mut execution = ExecutionContext::new();
    for i in 0..config.network_tasks {
        execution.add_network_task(task(TaskKind::Network, i));
    }
    for i in 0..config.processing_tasks {
        execution.add_processing_task(task(TaskKind::Processing, i));
    }

    let mut ctx = JobContext::new(config.job_name.clone(), execution);
    for i in 0..config.listeners {
        ctx.register_listener(Arc::new(SimulatedListener {
            name: format!("listener-{}", i),
            fail: config.failing_listeners.contains(&i),
            journal: journal.clone(),
        }));
    }
    ctx
}

/// Run start, wait for completion or shutdown, then deliver the terminal event.
pub async fn run(config: SimulationConfig, shutdown: CancellationToken) -> SimulationReport {
    let journal = Journal::default();
    let ctx = Arc::new(build_context(&config, &journal));
    let processor = JobEventProcessor::with_config(ctx.clone(), config.processor.clone());
    let mut errors = Vec::new();

    let (outcome, terminal_event, payload) =
        match deliver(&processor, JobEvent::ExecutionStart, Payload::none()).await {
            Err(mut start_errors) => {
                let cause = start_errors.join("; ");
                errors.append(&mut start_errors);
                (
                    SimulationOutcome::StartFailed,
                    JobEvent::ExecutionFailure,
                    Payload::new(cause),
                )
            }
            Ok(()) => {
                tokio::select! {
                    _ = tokio::time::sleep(config.run_duration) => {
                        (SimulationOutcome::Completed, JobEvent::ExecutionSuccess, Payload::none())
                    }
                    _ = shutdown.cancelled() => {
                        tracing::info!(job_id = %ctx.id(), "Shutdown requested, interrupting job");
                        (SimulationOutcome::Interrupted, JobEvent::InterruptionSuccess, Payload::none())
                    }
                }
            }
        };

    if let Err(mut terminal_errors) = deliver(&processor, terminal_event, payload).await {
        errors.append(&mut terminal_errors);
    }

    tracing::info!(job_id = %ctx.id(), %outcome, errors = errors.len(), "Simulation finished");

    SimulationReport {
        job_id: ctx.id(),
        job_name: ctx.name().to_string(),
        outcome,
        terminal_event,
        errors,
        journal: journal.entries(),
    }
}

/// Hand one event to the processor on the blocking pool.
async fn deliver(
    processor: &JobEventProcessor,
    event: JobEvent,
    payload: Payload,
) -> Result<(), Vec<String>> {
    let processor = processor.clone();
    match tokio::task::spawn_blocking(move || processor.process_request(event, &payload)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(describe(&err)),
        Err(join_err) => Err(vec![format!("{} processing aborted: {}", event, join_err)]),
    }
}

/// One line per underlying failure.
pub fn describe(err: &LifecycleError) -> Vec<String> {
    match err {
        LifecycleError::Task(task) => vec![task.to_string()],
        LifecycleError::Listeners(combined) => combined.iter().map(|f| f.to_string()).collect(),
        LifecycleError::Teardown {
            destroy_failures,
            listener_failures,
        } => destroy_failures
            .iter()
            .map(|f| f.to_string())
            .chain(
                listener_failures
                    .iter()
                    .flat_map(|c| c.iter().map(|f| f.to_string())),
            )
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_context_names_and_order() {
        let journal = Journal::default();
        let ctx = build_context(&SimulationConfig::new(2, 1, 3), &journal);

        let network: Vec<&str> = ctx
            .execution_context()
            .network_tasks()
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(network, vec!["network-0", "network-1"]);
        assert_eq!(ctx.execution_context().processing_tasks().len(), 1);
        assert_eq!(ctx.listeners().len(), 3);
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn journal_records_in_order() {
        let journal = Journal::default();
        journal.record("a", "init");
        journal.record("b", "destroy");
        let actions: Vec<String> = journal
            .entries()
            .iter()
            .map(|e| format!("{}.{}", e.actor, e.action))
            .collect();
        assert_eq!(actions, vec!["a.init", "b.destroy"]);
    }
}
