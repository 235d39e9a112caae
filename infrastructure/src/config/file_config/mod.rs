//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod consensus;
mod cost;
mod engine;
mod evaluators;
mod output;
mod triage;

pub use backend::FileBackendConfig;
pub use consensus::FileConsensusConfig;
pub use cost::FileCostConfig;
pub use engine::FileEngineConfig;
pub use evaluators::FileEvaluatorsConfig;
pub use output::FileOutputConfig;
pub use triage::FileTriageConfig;

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Evaluator pool settings
    pub evaluators: FileEvaluatorsConfig,
    /// Consensus tuning
    pub consensus: FileConsensusConfig,
    /// Execution engine settings
    pub engine: FileEngineConfig,
    /// Budget and pricing
    pub cost: FileCostConfig,
    /// Decision matrix location
    pub triage: FileTriageConfig,
    /// Reasoning backend command
    pub backend: FileBackendConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.evaluators.validate());
        issues.extend(self.consensus.validate());
        issues.extend(self.engine.validate());
        issues.extend(self.cost.validate());
        issues.extend(self.backend.validate());

        // A plan larger than the evaluators may ask for can never happen
        let max_agents = self.engine.max_agents as u64;
        let max_total = u64::from(self.evaluators.max_total_agents);
        if max_agents > 0 && max_total > max_agents {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "engine.max_agents".to_string(),
                },
                format!(
                    "engine.max_agents ({max_agents}) is below evaluators.max_total_agents ({max_total}); large consensus plans will be rejected"
                ),
            ));
        }

        issues
    }
}
