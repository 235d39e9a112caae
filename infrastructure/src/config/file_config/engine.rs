//! Engine configuration from TOML (`[engine]` section)

use council_application::EngineParams;
use council_domain::{ConfigIssue, ConfigIssueCode, GateComponent, PlanParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration
///
/// # Example
///
/// ```toml
/// [engine]
/// max_refinement_rounds = 2
/// agent_timeout_seconds = 600
/// max_agents = 8
/// domains_per_agent = 1
/// gate_components = ["security", "correctness"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub max_refinement_rounds: u32,
    pub agent_timeout_seconds: u64,
    pub max_agents: usize,
    pub domains_per_agent: usize,
    /// Used when no `--gate` is given
    pub gate_components: Vec<String>,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            max_refinement_rounds: params.max_refinement_rounds,
            agent_timeout_seconds: params.agent_timeout.as_secs(),
            max_agents: params.plan.max_agents,
            domains_per_agent: params.plan.domains_per_agent,
            gate_components: Vec::new(),
        }
    }
}

impl FileEngineConfig {
    pub fn to_params(&self) -> EngineParams {
        EngineParams::default()
            .with_max_refinement_rounds(self.max_refinement_rounds)
            .with_agent_timeout(Duration::from_secs(self.agent_timeout_seconds))
            .with_plan(PlanParams {
                max_agents: self.max_agents,
                domains_per_agent: self.domains_per_agent,
            })
    }

    pub fn gate_components(&self) -> Vec<GateComponent> {
        self.gate_components
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(GateComponent::new)
            .collect()
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.agent_timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "engine.agent_timeout_seconds".to_string(),
                },
                "engine.agent_timeout_seconds cannot be 0",
            ));
        }

        if self.max_agents == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "engine.max_agents".to_string(),
                },
                "engine.max_agents cannot be 0",
            ));
        }

        if self.domains_per_agent == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "engine.domains_per_agent".to_string(),
                },
                "engine.domains_per_agent is 0; agents will get no domain focus",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = FileEngineConfig::default();
        assert_eq!(config.max_refinement_rounds, 3);
        assert!(config.gate_components().is_empty());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_gate_components_normalized() {
        let config = FileEngineConfig {
            gate_components: vec!["Security".into(), " ".into(), "code quality".into()],
            ..Default::default()
        };
        let names: Vec<_> = config
            .gate_components()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["security", "code_quality"]);
    }

    #[test]
    fn test_zero_max_agents_is_error() {
        let config = FileEngineConfig {
            max_agents: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 1);
    }
}
