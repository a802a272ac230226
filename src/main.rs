use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use job_lifecycle::config::{ProcessorConfig, SimulationConfig, TeardownPolicy};
use job_lifecycle::job::{EventCategory, JobEvent};
use job_lifecycle::shutdown::install_shutdown_handler;
use job_lifecycle::simulation::{self, SimulationReport};

#[derive(Parser, Debug)]
#[command(name = "job-lifecycle")]
#[command(version)]
#[command(about = "Job lifecycle coordinator: task init/teardown and listener notification")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a simulated job from EXECUTION_START to its terminal event
    Simulate(SimulateArgs),

    /// List lifecycle events and what the processor does for each
    Events {
        /// Output format
        #[arg(long, short = 'o', default_value = "table")]
        output: OutputFormat,
    },
}

// =============================================================================
// Simulate Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Job name
    #[arg(long, default_value = "simulated-job")]
    name: String,

    /// Number of network tasks
    #[arg(long, default_value = "2")]
    network_tasks: usize,

    /// Number of processing tasks
    #[arg(long, default_value = "2")]
    processing_tasks: usize,

    /// Number of registered listeners
    #[arg(long, default_value = "1")]
    listeners: usize,

    /// Index of a listener that fails when notified (repeatable)
    #[arg(long = "fail-listener")]
    fail_listeners: Vec<usize>,

    /// Index of a network task whose destroy fails (repeatable)
    #[arg(long = "fail-destroy")]
    fail_destroys: Vec<usize>,

    /// Index of a processing task whose init fails
    #[arg(long)]
    fail_init: Option<usize>,

    /// How long the job runs before completing, in milliseconds.
    /// Ctrl-C before then interrupts it instead.
    #[arg(long, default_value = "500")]
    run_ms: u64,

    /// Stop teardown at the first failing destroy
    #[arg(long)]
    fail_fast_teardown: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct EventOutput {
    event: JobEvent,
    action: &'static str,
}

fn action(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Start => "init network tasks, then processing tasks",
        EventCategory::Terminal => "notify listeners, then destroy network tasks",
        EventCategory::Passive => "none",
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

async fn run_simulate(args: SimulateArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let teardown_policy = if args.fail_fast_teardown {
        TeardownPolicy::FailFast
    } else {
        TeardownPolicy::CollectAll
    };

    let config = SimulationConfig {
        job_name: args.name,
        network_tasks: args.network_tasks,
        processing_tasks: args.processing_tasks,
        listeners: args.listeners,
        failing_listeners: args.fail_listeners,
        failing_destroys: args.fail_destroys,
        failing_init: args.fail_init,
        run_duration: Duration::from_millis(args.run_ms),
        processor: ProcessorConfig::default().with_teardown_policy(teardown_policy),
    };

    let shutdown = install_shutdown_handler()?;
    let report = simulation::run(config, shutdown).await;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }

    Ok(report.errors.is_empty())
}

fn print_report(report: &SimulationReport) {
    println!("Job:            {} ({})", report.job_name, report.job_id);
    println!("Outcome:        {}", report.outcome);
    println!("Terminal event: {}", report.terminal_event);
    println!();
    println!("{:<32} {:<20} ACTION", "TIME", "ACTOR");
    for entry in &report.journal {
        println!(
            "{:<32} {:<20} {}",
            entry.at.to_rfc3339(),
            entry.actor,
            entry.action
        );
    }
    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for err in &report.errors {
            println!("  - {}", err);
        }
    }
}

fn handle_events(output: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<EventOutput> = JobEvent::ALL
        .iter()
        .map(|&event| EventOutput {
            event,
            action: action(event.category()),
        })
        .collect();

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Table => {
            println!("{:<24} ACTION", "EVENT");
            for e in &events {
                println!("{:<24} {}", e.event, e.action);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Simulate(simulate_args) => {
            if !run_simulate(simulate_args).await? {
                std::process::exit(1);
            }
        }
        Commands::Events { output } => {
            handle_events(&output)?;
        }
    }

    Ok(())
}
