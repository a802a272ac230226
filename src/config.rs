use std::time::Duration;

/// How network-task teardown reacts to a failing `destroy()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeardownPolicy {
    /// Attempt `destroy()` on every task and report all failures together.
    #[default]
    CollectAll,
    /// Stop at the first failing `destroy()` and report only that one.
    FailFast,
}

/// Configuration for [`JobEventProcessor`](crate::processor::JobEventProcessor).
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub teardown_policy: TeardownPolicy,
    /// Record a panicking listener as a listener failure instead of unwinding
    /// through the processor. Teardown runs either way.
    pub catch_listener_panics: bool,
    /// Listener calls slower than this are logged at warn level.
    pub slow_listener_threshold: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            teardown_policy: TeardownPolicy::CollectAll,
            catch_listener_panics: true,
            slow_listener_threshold: Duration::from_secs(5),
        }
    }
}

impl ProcessorConfig {
    pub fn with_teardown_policy(mut self, policy: TeardownPolicy) -> Self {
        self.teardown_policy = policy;
        self
    }

    pub fn with_catch_listener_panics(mut self, catch: bool) -> Self {
        self.catch_listener_panics = catch;
        self
    }

    pub fn with_slow_listener_threshold(mut self, threshold: Duration) -> Self {
        self.slow_listener_threshold = threshold;
        self
    }
}

/// Shape of the job driven by the `simulate` command.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub job_name: String,
    pub network_tasks: usize,
    pub processing_tasks: usize,
    pub listeners: usize,
    /// Listener indexes that fail when notified
    pub failing_listeners: Vec<usize>,
    /// Network task indexes whose `destroy()` fails
    pub failing_destroys: Vec<usize>,
    /// Processing task index whose `init()` fails
    pub failing_init: Option<usize>,
    /// How long the job runs before it completes on its own
    pub run_duration: Duration,
    pub processor: ProcessorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            job_name: "simulated-job".to_string(),
            network_tasks: 2,
            processing_tasks: 2,
            listeners: 1,
            failing_listeners: Vec::new(),
            failing_destroys: Vec::new(),
            failing_init: None,
            run_duration: Duration::from_millis(500),
            processor: ProcessorConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(network_tasks: usize, processing_tasks: usize, listeners: usize) -> Self {
        Self {
            network_tasks,
            processing_tasks,
            listeners,
            ..Default::default()
        }
    }

    pub fn with_failing_listener(mut self, index: usize) -> Self {
        self.failing_listeners.push(index);
        self
    }

    pub fn with_failing_destroy(mut self, index: usize) -> Self {
        self.failing_destroys.push(index);
        self
    }

    pub fn with_failing_init(mut self, index: usize) -> Self {
        self.failing_init = Some(index);
        self
    }

    pub fn with_run_duration(mut self, duration: Duration) -> Self {
        self.run_duration = duration;
        self
    }
}
