//! Consensus configuration from TOML (`[consensus]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, ConsensusParams};
use serde::{Deserialize, Serialize};

/// Raw consensus configuration
///
/// # Example
///
/// ```toml
/// [consensus]
/// budget_damping_factor = 0.5
/// budget_pressure_ratio = 0.9
/// efficiency_cliff_threshold = 10
/// security_domains = ["security", "payments"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub budget_damping_factor: f64,
    pub budget_pressure_ratio: f64,
    pub efficiency_cliff_threshold: u32,
    pub security_domains: Vec<String>,
    pub escalation_roles: Vec<String>,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let params = ConsensusParams::default();
        Self {
            budget_damping_factor: params.budget_damping_factor,
            budget_pressure_ratio: params.budget_pressure_ratio,
            efficiency_cliff_threshold: params.efficiency_cliff_threshold,
            security_domains: params.security_domains,
            escalation_roles: params.escalation_roles,
        }
    }
}

impl FileConsensusConfig {
    pub fn to_params(&self) -> ConsensusParams {
        ConsensusParams {
            budget_pressure_ratio: self.budget_pressure_ratio,
            budget_damping_factor: self.budget_damping_factor,
            efficiency_cliff_threshold: self.efficiency_cliff_threshold,
            security_domains: self
                .security_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
            escalation_roles: self
                .escalation_roles
                .iter()
                .map(|r| r.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(self.budget_damping_factor > 0.0 && self.budget_damping_factor <= 1.0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "consensus.budget_damping_factor".to_string(),
                },
                format!(
                    "consensus.budget_damping_factor: {} is outside (0, 1]",
                    self.budget_damping_factor
                ),
            ));
        }

        if !(self.budget_pressure_ratio > 0.0 && self.budget_pressure_ratio <= 1.0) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "consensus.budget_pressure_ratio".to_string(),
                },
                format!(
                    "consensus.budget_pressure_ratio: {} is outside (0, 1]; damping may never or always apply",
                    self.budget_pressure_ratio
                ),
            ));
        }

        if self.efficiency_cliff_threshold == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "consensus.efficiency_cliff_threshold".to_string(),
                },
                "consensus.efficiency_cliff_threshold is 0; every plan will be flagged",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Severity;

    #[test]
    fn test_default_matches_domain() {
        let config = FileConsensusConfig::default();
        assert_eq!(config.to_params(), ConsensusParams::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_damping_out_of_range() {
        let config = FileConsensusConfig {
            budget_damping_factor: 1.5,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_domains_lowercased() {
        let config = FileConsensusConfig {
            security_domains: vec![" PCI ".into()],
            ..Default::default()
        };
        assert_eq!(config.to_params().security_domains, vec!["pci"]);
    }
}
