//! Quality gate entities

use crate::core::string::normalize_label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named check the gate must pass (e.g. "security", "correctness")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateComponent(String);

impl GateComponent {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(normalize_label(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GateComponent {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Verdict for a single component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResult {
    pub name: String,
    pub is_acceptable: bool,
    #[serde(default)]
    pub problems: Vec<String>,
}

impl ComponentResult {
    pub fn acceptable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_acceptable: true,
            problems: Vec::new(),
        }
    }

    pub fn failing(name: impl Into<String>, problems: Vec<String>) -> Self {
        Self {
            name: name.into(),
            is_acceptable: false,
            problems,
        }
    }
}

/// Outcome of one gate evaluation
///
/// `component_results` keeps the configured component order. Built only
/// through the constructors so `threshold_met` always equals the AND of
/// every component verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    threshold_met: bool,
    pub feedback: String,
    component_results: Vec<ComponentResult>,
}

impl GateResult {
    /// Result of a gate with no configured components
    pub fn trivial_pass() -> Self {
        Self {
            threshold_met: true,
            feedback: "No gate components configured".to_string(),
            component_results: Vec::new(),
        }
    }

    /// Combine component verdicts; the threshold is met only if all pass
    pub fn from_components(feedback: impl Into<String>, results: Vec<ComponentResult>) -> Self {
        Self {
            threshold_met: results.iter().all(|c| c.is_acceptable),
            feedback: feedback.into(),
            component_results: results,
        }
    }

    /// Conservative verdict used when the gate itself could not be evaluated:
    /// every component fails with `reason`.
    pub fn failed_evaluation(components: &[GateComponent], reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            threshold_met: false,
            feedback: format!("Gate evaluation failed: {reason}"),
            component_results: components
                .iter()
                .map(|c| ComponentResult::failing(c.name(), vec![reason.clone()]))
                .collect(),
        }
    }

    pub fn threshold_met(&self) -> bool {
        self.threshold_met
    }

    pub fn component_results(&self) -> &[ComponentResult] {
        &self.component_results
    }

    pub fn component(&self, name: &str) -> Option<&ComponentResult> {
        self.component_results.iter().find(|c| c.name == name)
    }

    /// Failing components in gate order
    pub fn failing_components(&self) -> impl Iterator<Item = &ComponentResult> {
        self.component_results.iter().filter(|c| !c.is_acceptable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name_normalized() {
        assert_eq!(GateComponent::new("  Code Quality ").name(), "code_quality");
    }

    #[test]
    fn test_trivial_pass() {
        let result = GateResult::trivial_pass();
        assert!(result.threshold_met());
        assert!(result.component_results().is_empty());
    }

    #[test]
    fn test_threshold_is_and_of_components() {
        let pass = GateResult::from_components(
            "ok",
            vec![
                ComponentResult::acceptable("security"),
                ComponentResult::acceptable("correctness"),
            ],
        );
        assert!(pass.threshold_met());

        let fail = GateResult::from_components(
            "not yet",
            vec![
                ComponentResult::acceptable("security"),
                ComponentResult::failing("correctness", vec!["edge case".into()]),
            ],
        );
        assert!(!fail.threshold_met());
        let failing: Vec<_> = fail.failing_components().map(|c| c.name.as_str()).collect();
        assert_eq!(failing, vec!["correctness"]);
    }

    #[test]
    fn test_failed_evaluation_fails_everything() {
        let components = vec![GateComponent::new("security"), GateComponent::new("performance")];
        let result = GateResult::failed_evaluation(&components, "timed out");
        assert!(!result.threshold_met());
        assert_eq!(result.failing_components().count(), 2);
        assert_eq!(result.component("security").unwrap().problems, vec!["timed out"]);
    }
}
