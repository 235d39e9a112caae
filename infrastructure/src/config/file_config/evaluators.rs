//! Evaluator pool configuration from TOML (`[evaluators]` section)

use council_application::EvaluatorPoolParams;
use council_domain::{ConfigIssue, ConfigIssueCode, EvaluatorConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw evaluator configuration
///
/// # Example
///
/// ```toml
/// [evaluators]
/// timeout_seconds = 90
/// quorum = 2
/// max_total_agents = 16
///
/// [[evaluators.pool]]
/// name = "security"
/// framing = "Assume an attacker reads every line."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEvaluatorsConfig {
    pub timeout_seconds: u64,
    pub quorum: usize,
    pub max_total_agents: u32,
    pub pool: Vec<EvaluatorConfig>,
}

impl Default for FileEvaluatorsConfig {
    fn default() -> Self {
        let params = EvaluatorPoolParams::default();
        Self {
            timeout_seconds: params.timeout.as_secs(),
            quorum: params.quorum,
            max_total_agents: params.max_total_agents,
            pool: params.evaluators,
        }
    }
}

impl FileEvaluatorsConfig {
    pub fn to_params(&self) -> EvaluatorPoolParams {
        EvaluatorPoolParams::default()
            .with_evaluators(self.pool.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_quorum(self.quorum)
            .with_max_total_agents(self.max_total_agents)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.pool.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyList {
                    field: "evaluators.pool".to_string(),
                },
                "evaluators.pool: at least one evaluator is required",
            ));
        }

        let mut seen: Vec<&str> = Vec::new();
        for evaluator in &self.pool {
            if evaluator.name.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyList {
                        field: "evaluators.pool.name".to_string(),
                    },
                    "evaluators.pool: evaluator name cannot be empty",
                ));
            } else if seen.contains(&evaluator.name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::Duplicate {
                        field: "evaluators.pool.name".to_string(),
                        value: evaluator.name.clone(),
                    },
                    format!("evaluators.pool: evaluator '{}' listed twice", evaluator.name),
                ));
            }
            seen.push(&evaluator.name);
        }

        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "evaluators.timeout_seconds".to_string(),
                },
                "evaluators.timeout_seconds cannot be 0",
            ));
        }

        if self.quorum == 0 || (!self.pool.is_empty() && self.quorum > self.pool.len()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "evaluators.quorum".to_string(),
                },
                format!(
                    "evaluators.quorum: {} is outside 1..={}",
                    self.quorum,
                    self.pool.len()
                ),
            ));
        }

        if self.max_total_agents == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "evaluators.max_total_agents".to_string(),
                },
                "evaluators.max_total_agents cannot be 0",
            ));
        }

        issues
    }
}
