use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle transition triggers delivered by the job state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobEvent {
    InitStart,
    InitSuccess,
    InitFailure,
    DeploymentStart,
    DeploymentSuccess,
    DeploymentFailure,
    ExecutionStart,
    ExecutionSuccess,
    ExecutionFailure,
    InterruptionStart,
    InterruptionSuccess,
    InterruptionFailure,
    FinalizationStart,
    FinalizationSuccess,
    FinalizationFailure,
}

/// What the lifecycle processor does for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// Initialize every task.
    Start,
    /// Notify listeners, then tear down network tasks.
    Terminal,
    /// No side effects.
    Passive,
}

impl JobEvent {
    pub const ALL: [JobEvent; 15] = [
        JobEvent::InitStart,
        JobEvent::InitSuccess,
        JobEvent::InitFailure,
        JobEvent::DeploymentStart,
        JobEvent::DeploymentSuccess,
        JobEvent::DeploymentFailure,
        JobEvent::ExecutionStart,
        JobEvent::ExecutionSuccess,
        JobEvent::ExecutionFailure,
        JobEvent::InterruptionStart,
        JobEvent::InterruptionSuccess,
        JobEvent::InterruptionFailure,
        JobEvent::FinalizationStart,
        JobEvent::FinalizationSuccess,
        JobEvent::FinalizationFailure,
    ];

    pub fn category(self) -> EventCategory {
        match self {
            JobEvent::ExecutionStart => EventCategory::Start,
            JobEvent::ExecutionSuccess
            | JobEvent::ExecutionFailure
            | JobEvent::InterruptionSuccess
            | JobEvent::InterruptionFailure => EventCategory::Terminal,
            JobEvent::InitStart
            | JobEvent::InitSuccess
            | JobEvent::InitFailure
            | JobEvent::DeploymentStart
            | JobEvent::DeploymentSuccess
            | JobEvent::DeploymentFailure
            | JobEvent::InterruptionStart
            | JobEvent::FinalizationStart
            | JobEvent::FinalizationSuccess
            | JobEvent::FinalizationFailure => EventCategory::Passive,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.category() == EventCategory::Terminal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobEvent::InitStart => "INIT_START",
            JobEvent::InitSuccess => "INIT_SUCCESS",
            JobEvent::InitFailure => "INIT_FAILURE",
            JobEvent::DeploymentStart => "DEPLOYMENT_START",
            JobEvent::DeploymentSuccess => "DEPLOYMENT_SUCCESS",
            JobEvent::DeploymentFailure => "DEPLOYMENT_FAILURE",
            JobEvent::ExecutionStart => "EXECUTION_START",
            JobEvent::ExecutionSuccess => "EXECUTION_SUCCESS",
            JobEvent::ExecutionFailure => "EXECUTION_FAILURE",
            JobEvent::InterruptionStart => "INTERRUPTION_START",
            JobEvent::InterruptionSuccess => "INTERRUPTION_SUCCESS",
            JobEvent::InterruptionFailure => "INTERRUPTION_FAILURE",
            JobEvent::FinalizationStart => "FINALIZATION_START",
            JobEvent::FinalizationSuccess => "FINALIZATION_SUCCESS",
            JobEvent::FinalizationFailure => "FINALIZATION_FAILURE",
        }
    }
}

impl std::fmt::Display for JobEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job event: {0}")]
pub struct UnknownJobEvent(pub String);

impl FromStr for JobEvent {
    type Err = UnknownJobEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        JobEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == wanted)
            .ok_or_else(|| UnknownJobEvent(s.to_string()))
    }
}
