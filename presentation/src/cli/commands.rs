//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use council_domain::ProjectPhase;
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Consensus, plan details, agent outputs and the synthesis
    Full,
    /// Headline figures and the final result only
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Summary => council_domain::OutputFormat::Summary,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "Plan and run multi-agent work from a council of evaluators")]
#[command(long_about = r#"
agent-council asks several differently-framed evaluators how a task should be
staffed, merges their answers into one consensus, and can then run the plan as
a gated workflow: agents work, a quality gate checks the result, failing parts
are refined a bounded number of times, and a synthesizer writes the final answer.

Configuration files are loaded from (in priority order):
1. AGENT_COUNCIL_<SECTION>__<KEY>   Environment variables
2. --config <path>                  Explicit config file
3. ./council.toml                   Project-level config
4. ~/.config/agent-council/config.toml   Global config

Example:
  agent-council plan "Add rate limiting to the public API"
  agent-council orchestrate "Add OAuth login" --gate security --gate correctness
  agent-council -o json orchestrate "Migrate the billing schema" --phase implementation
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides `[output] format`)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to a file (default name is timestamped)
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Build a consensus plan for a task without running it
    Plan {
        /// The task to plan
        task: String,

        /// Extra context passed to every evaluator
        #[arg(long, value_name = "TEXT")]
        context: Option<String>,
    },

    /// Plan a task and run it through the gated workflow
    Orchestrate {
        /// The task to run
        task: String,

        /// Extra context passed to evaluators and agents
        #[arg(long, value_name = "TEXT")]
        context: Option<String>,

        /// Quality-gate component (repeatable; overrides `[engine] gate_components`)
        #[arg(long = "gate", value_name = "NAME")]
        gates: Vec<String>,

        /// Project phase to start from; earlier phases fold into it
        #[arg(long, value_name = "PHASE")]
        phase: Option<ProjectPhase>,

        /// Treat the task as critical path (raises quality to critical)
        #[arg(long)]
        critical_path: bool,
    },
}
