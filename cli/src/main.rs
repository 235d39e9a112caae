//! CLI entrypoint for agent-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    CostTracker, EvaluatorPool, GatedFanoutEngine, NoProgress, OrchestrateInput, PlanTaskInput,
    PlanTaskUseCase, ProgressNotifier,
};
use council_domain::{
    ComplexityTriage, ConsensusBuilder, GateComponent, OutputFormat, Severity, TaskDescription,
    has_errors,
};
use council_infrastructure::{
    CommandReasoningBackend, CommandRunner, CommandWorkflowExecutor, ConfigLoader, FileConfig,
    InMemoryCostTracker, TemplateAgentComposer, load_decision_matrix,
};
use council_presentation::{Cli, Command, ConsoleFormatter, OutputFormatter, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    check_config(&config)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command else {
        bail!("No command given. Try `agent-council plan \"<task>\"` or `agent-council --help`.");
    };

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    info!("Starting agent-council");

    // === Dependency Injection ===
    let matrix = load_decision_matrix(config.triage.decision_matrix.as_deref())?;
    let triage = ComplexityTriage::new(matrix)?;

    let tracker = Arc::new(InMemoryCostTracker::new(config.cost.budget));
    let backend = Arc::new(CommandReasoningBackend::new(
        CommandRunner::new(config.backend.command.clone(), config.backend.args.clone()),
        config.cost.price_per_1k_tokens,
    ));
    let pool = EvaluatorPool::new(backend, tracker.clone(), config.evaluators.to_params());
    let planner = PlanTaskUseCase::new(
        triage,
        pool,
        ConsensusBuilder::new(config.consensus.to_params()),
        tracker.clone(),
    );

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };
    let formatter = ConsoleFormatter;

    match command {
        Command::Plan { task, context } => {
            let mut input = PlanTaskInput::new(TaskDescription::try_new(task)?);
            if let Some(context) = context {
                input = input.with_context(context);
            }

            let output = planner
                .execute_with_progress(input, progress.as_ref(), Some(cancellation))
                .await?;
            println!("{}", formatter.plan(&output, format));
        }
        Command::Orchestrate {
            task,
            context,
            gates,
            phase,
            critical_path,
        } => {
            let gates: Vec<GateComponent> = if gates.is_empty() {
                config.engine.gate_components()
            } else {
                gates.iter().map(GateComponent::new).collect()
            };

            let mut input =
                OrchestrateInput::new(TaskDescription::try_new(task)?).with_gates(gates);
            if let Some(context) = context {
                input = input.with_context(context);
            }
            if let Some(phase) = phase {
                input = input.with_project_phase(phase);
            }
            if critical_path {
                input = input.critical_path();
            }

            let (program, args) = config.backend.executor();
            let engine = GatedFanoutEngine::new(
                Arc::new(planner),
                Arc::new(CommandWorkflowExecutor::new(CommandRunner::new(program, args))),
                Arc::new(TemplateAgentComposer::new()),
                config.engine.to_params(),
            );

            match engine
                .execute_with_progress(input, progress.as_ref(), Some(cancellation))
                .await
            {
                Ok(response) => println!("{}", formatter.run(&response, format)),
                Err(failure) => {
                    println!("{}", formatter.failure(&failure, format));
                    return Err(failure.into());
                }
            }
        }
    }

    info!(
        total_cost = tracker.total(),
        billed_calls = tracker.calls(),
        budget = tracker.budget(),
        "Finished"
    );
    Ok(())
}

/// Install the tracing subscriber: stderr always, plus a file with `--log-file`
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = if path.as_os_str().is_empty() {
                default_log_path()
            } else {
                path.to_path_buf()
            };
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            eprintln!("Logging to {}", path.display());
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn default_log_path() -> PathBuf {
    let name = format!(
        "agent-council-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    dirs::data_local_dir()
        .map(|d| d.join("agent-council").join("logs").join(&name))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Log warnings; refuse to start on errors
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    if has_errors(&issues) {
        bail!("Invalid configuration; fix the errors above or run with --no-config");
    }
    Ok(())
}

fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling run");
            token.cancel();
        }
    });
}
