//! Evaluation entities
//!
//! An [`Evaluation`] is one evaluator's structured opinion on how to staff
//! and run a task. An [`EvaluatorResult`] wraps it with the evaluator that
//! produced it and what it cost.

use super::value_objects::{Complexity, QualityLevel, WorkflowPattern};
use crate::core::string::normalize_label;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One evaluator's structured assessment of a task
///
/// # Example
///
/// ```
/// use council_domain::evaluation::{Complexity, Evaluation};
///
/// let eval = Evaluation::new(Complexity::Medium)
///     .with_total_agents(4)
///     .with_roles(["researcher", "implementer"])
///     .with_confidence(0.8);
/// assert_eq!(eval.total_agents, 4);
/// assert_eq!(eval.role_priorities[0], "researcher");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub complexity: Complexity,
    #[serde(default)]
    pub complexity_reason: String,
    pub total_agents: u32,
    #[serde(default)]
    pub agent_reason: String,
    #[serde(default = "default_rounds")]
    pub rounds_needed: u32,
    /// Front is highest priority
    #[serde(default)]
    pub role_priorities: Vec<String>,
    #[serde(default)]
    pub primary_domains: Vec<String>,
    #[serde(default)]
    pub domain_reason: String,
    pub workflow_pattern: WorkflowPattern,
    #[serde(default)]
    pub workflow_reason: String,
    pub quality_level: QualityLevel,
    #[serde(default)]
    pub quality_reason: String,
    #[serde(default)]
    pub rules_applied: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub summary: String,
}

fn default_rounds() -> u32 {
    1
}

impl Evaluation {
    /// Create an evaluation with neutral defaults for everything but complexity
    pub fn new(complexity: Complexity) -> Self {
        Self {
            complexity,
            complexity_reason: String::new(),
            total_agents: 1,
            agent_reason: String::new(),
            rounds_needed: 1,
            role_priorities: Vec::new(),
            primary_domains: Vec::new(),
            domain_reason: String::new(),
            workflow_pattern: WorkflowPattern::Parallel,
            workflow_reason: String::new(),
            quality_level: QualityLevel::Basic,
            quality_reason: String::new(),
            rules_applied: Vec::new(),
            confidence: 0.5,
            summary: String::new(),
        }
    }

    pub fn with_total_agents(mut self, total_agents: u32) -> Self {
        self.total_agents = total_agents;
        self
    }

    pub fn with_rounds_needed(mut self, rounds: u32) -> Self {
        self.rounds_needed = rounds;
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_priorities = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_workflow(mut self, pattern: WorkflowPattern) -> Self {
        self.workflow_pattern = pattern;
        self
    }

    pub fn with_quality(mut self, quality: QualityLevel) -> Self {
        self.quality_level = quality;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Bring a raw evaluation inside the model's invariants.
    ///
    /// - `total_agents` clamped to `[1, max_total_agents]`
    /// - `rounds_needed` at least 1
    /// - `confidence` clamped to `[0, 1]` (NaN becomes 0)
    /// - roles and domains normalised and de-duplicated, order preserved
    pub fn normalized(mut self, max_total_agents: u32) -> Self {
        self.total_agents = self.total_agents.clamp(1, max_total_agents.max(1));
        self.rounds_needed = self.rounds_needed.max(1);
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        self.role_priorities = dedup_labels(&self.role_priorities);
        self.primary_domains = dedup_labels(&self.primary_domains);
        self
    }
}

fn dedup_labels(labels: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(labels.len());
    for label in labels {
        let label = normalize_label(label);
        if !label.is_empty() && !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen
}

/// Configuration of one evaluator in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Unique evaluator name (e.g. "efficiency")
    pub name: String,
    /// Perspective the evaluator is asked to take
    pub framing: String,
}

impl EvaluatorConfig {
    pub fn new(name: impl Into<String>, framing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            framing: framing.into(),
        }
    }

    /// The default five-evaluator pool, each with a distinct framing
    pub fn default_pool() -> Vec<EvaluatorConfig> {
        vec![
            EvaluatorConfig::new(
                "efficiency",
                "Favour the smallest team and fewest rounds that can credibly finish the task.",
            ),
            EvaluatorConfig::new(
                "quality",
                "Favour correctness and verification; staff reviewers and testers generously.",
            ),
            EvaluatorConfig::new(
                "risk",
                "Look for security, data-loss and operational risks and staff to contain them.",
            ),
            EvaluatorConfig::new(
                "innovation",
                "Look for non-obvious approaches and staff exploration and design early.",
            ),
            EvaluatorConfig::new(
                "pragmatic",
                "Balance cost against outcome as an experienced delivery lead would.",
            ),
        ]
    }
}

/// One successful evaluator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorResult {
    pub evaluator: EvaluatorConfig,
    pub evaluation: Evaluation,
    /// Cost reported for this call (currency units of the configured budget)
    pub cost: f64,
    pub latency: Duration,
}

impl EvaluatorResult {
    pub fn new(evaluator: EvaluatorConfig, evaluation: Evaluation) -> Self {
        Self {
            evaluator,
            evaluation,
            cost: 0.0,
            latency: Duration::ZERO,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Evaluator name, for warnings and logs
    pub fn name(&self) -> &str {
        &self.evaluator.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_agents() {
        let eval = Evaluation::new(Complexity::Complex)
            .with_total_agents(40)
            .normalized(20);
        assert_eq!(eval.total_agents, 20);

        let eval = Evaluation::new(Complexity::Simple)
            .with_total_agents(0)
            .normalized(20);
        assert_eq!(eval.total_agents, 1);
    }

    #[test]
    fn test_normalized_confidence_and_rounds() {
        let eval = Evaluation::new(Complexity::Simple)
            .with_confidence(1.7)
            .with_rounds_needed(0)
            .normalized(10);
        assert_eq!(eval.confidence, 1.0);
        assert_eq!(eval.rounds_needed, 1);

        let eval = Evaluation::new(Complexity::Simple)
            .with_confidence(f64::NAN)
            .normalized(10);
        assert_eq!(eval.confidence, 0.0);
    }

    #[test]
    fn test_normalized_dedups_roles_preserving_order() {
        let eval = Evaluation::new(Complexity::Medium)
            .with_roles(["Researcher", "implementer", " researcher ", ""])
            .with_domains(["Security", "security", "APIs"])
            .normalized(10);
        assert_eq!(eval.role_priorities, vec!["researcher", "implementer"]);
        assert_eq!(eval.primary_domains, vec!["security", "apis"]);
    }

    #[test]
    fn test_default_pool_has_unique_names() {
        let pool = EvaluatorConfig::default_pool();
        assert_eq!(pool.len(), 5);
        let mut names: Vec<_> = pool.iter().map(|e| e.name.clone()).collect();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_deserialize_with_missing_reasons() {
        let json = r#"{
            "complexity": "complex",
            "total_agents": 5,
            "workflow_pattern": "hybrid",
            "quality_level": "thorough",
            "confidence": 0.7
        }"#;
        let eval: Evaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.complexity, Complexity::Complex);
        assert_eq!(eval.rounds_needed, 1);
        assert!(eval.role_priorities.is_empty());
    }
}
