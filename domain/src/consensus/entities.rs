//! Consensus entities

use crate::evaluation::{Complexity, QualityLevel, WorkflowPattern};
use serde::{Deserialize, Serialize};

/// A role with its aggregated priority score in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecommendation {
    pub role: String,
    pub score: f64,
}

impl RoleRecommendation {
    pub fn new(role: impl Into<String>, score: f64) -> Self {
        Self {
            role: role.into(),
            score,
        }
    }
}

/// The single planning decision aggregated from all evaluations
///
/// Read-only once produced. `role_recommendations` is ordered by score,
/// highest first; `domains` by how many evaluators named them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub complexity: Complexity,
    pub agent_count: u32,
    pub role_recommendations: Vec<RoleRecommendation>,
    pub domains: Vec<String>,
    pub workflow_pattern: WorkflowPattern,
    pub quality_level: QualityLevel,
    pub confidence: f64,
    /// Rounded mean of the evaluators' `rounds_needed`
    pub rounds_needed: u32,
    pub evaluator_count: usize,
    pub warnings: Vec<String>,
}

impl Consensus {
    /// Recommended roles, highest score first
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.role_recommendations.iter().map(|r| r.role.as_str())
    }

    /// Whether any warning contains `needle`
    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }

    /// Raise the quality level to at least `level`, recording why
    pub fn raise_quality(&mut self, level: QualityLevel, reason: &str) {
        if self.quality_level < level {
            self.warnings.push(format!(
                "Quality level raised from {} to {}: {}",
                self.quality_level, level, reason
            ));
            self.quality_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consensus() -> Consensus {
        Consensus {
            complexity: Complexity::Medium,
            agent_count: 3,
            role_recommendations: vec![
                RoleRecommendation::new("researcher", 0.9),
                RoleRecommendation::new("tester", 0.4),
            ],
            domains: vec!["api".to_string()],
            workflow_pattern: WorkflowPattern::Parallel,
            quality_level: QualityLevel::Basic,
            confidence: 0.7,
            rounds_needed: 1,
            evaluator_count: 3,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_roles_in_order() {
        let c = consensus();
        let roles: Vec<_> = c.roles().collect();
        assert_eq!(roles, vec!["researcher", "tester"]);
    }

    #[test]
    fn test_raise_quality() {
        let mut c = consensus();
        c.raise_quality(QualityLevel::Critical, "critical path");
        assert_eq!(c.quality_level, QualityLevel::Critical);
        assert!(c.has_warning("critical path"));

        // Never lowers
        c.raise_quality(QualityLevel::Thorough, "ignored");
        assert_eq!(c.quality_level, QualityLevel::Critical);
        assert_eq!(c.warnings.len(), 1);
    }
}
