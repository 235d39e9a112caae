//! Reading gate verdicts from model output
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "feedback": "overall comments",
//!   "components": {
//!     "security": { "is_acceptable": false, "problems": ["token logged in plaintext"] }
//!   }
//! }
//! ```

use super::entities::{ComponentResult, GateComponent, GateResult};
use crate::core::json::extract_json_object;
use crate::core::string::normalize_label;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateParseError {
    #[error("gate response contains no JSON object")]
    NoJson,

    #[error("malformed gate response: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct WireGate {
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    components: BTreeMap<String, WireComponent>,
}

#[derive(Deserialize)]
struct WireComponent {
    is_acceptable: bool,
    #[serde(default)]
    problems: Vec<String>,
}

/// Parse a gate answer against the configured components.
///
/// Components the answer does not mention are treated as not acceptable.
/// Components the answer invents are ignored.
pub fn parse_gate_result(
    response: &str,
    components: &[GateComponent],
) -> Result<GateResult, GateParseError> {
    let json = extract_json_object(response).ok_or(GateParseError::NoJson)?;
    let wire: WireGate =
        serde_json::from_str(json).map_err(|e| GateParseError::Malformed(e.to_string()))?;

    // Keys that normalise to the same component merge; one rejection fails it
    let mut verdicts: HashMap<String, WireComponent> = HashMap::new();
    for (name, verdict) in wire.components {
        verdicts
            .entry(normalize_label(&name))
            .and_modify(|merged| {
                merged.is_acceptable &= verdict.is_acceptable;
                merged.problems.extend(verdict.problems.iter().cloned());
            })
            .or_insert(verdict);
    }

    let results = components
        .iter()
        .map(|component| match verdicts.remove(component.name()) {
            Some(v) if v.is_acceptable => ComponentResult {
                name: component.name().to_string(),
                is_acceptable: true,
                problems: v.problems,
            },
            Some(v) => ComponentResult::failing(component.name(), v.problems),
            None => ComponentResult::failing(
                component.name(),
                vec!["no verdict returned for this component".to_string()],
            ),
        })
        .collect();

    Ok(GateResult::from_components(wire.feedback, results))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(names: &[&str]) -> Vec<GateComponent> {
        names.iter().map(|n| GateComponent::new(n)).collect()
    }

    #[test]
    fn test_parse_all_acceptable() {
        let response = r#"Here is my verdict:
```json
{"feedback": "looks good", "components": {"security": {"is_acceptable": true}, "Correctness": {"is_acceptable": true, "problems": []}}}
```"#;
        let result = parse_gate_result(response, &components(&["security", "correctness"])).unwrap();
        assert!(result.threshold_met());
        assert_eq!(result.feedback, "looks good");
    }

    #[test]
    fn test_missing_component_fails() {
        let response = r#"{"feedback": "partial", "components": {"security": {"is_acceptable": true}}}"#;
        let result = parse_gate_result(response, &components(&["security", "performance"])).unwrap();
        assert!(!result.threshold_met());
        let perf = result.component("performance").unwrap();
        assert!(!perf.is_acceptable);
        assert_eq!(perf.problems.len(), 1);
    }

    #[test]
    fn test_order_follows_configuration() {
        let response = r#"{"components": {"b": {"is_acceptable": false, "problems": ["x"]}, "a": {"is_acceptable": false}, "extra": {"is_acceptable": false}}}"#;
        let result = parse_gate_result(response, &components(&["a", "b"])).unwrap();
        let names: Vec<_> = result.component_results().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_colliding_keys_fail_if_any_rejects() {
        let response = r#"{"components": {"Security": {"is_acceptable": true}, "security ": {"is_acceptable": false, "problems": ["secret in url"]}}}"#;
        let result = parse_gate_result(response, &components(&["security"])).unwrap();
        let security = result.component("security").unwrap();
        assert!(!security.is_acceptable);
        assert_eq!(security.problems, vec!["secret in url".to_string()]);
        assert!(!result.threshold_met());
    }

    #[test]
    fn test_no_json() {
        assert_eq!(
            parse_gate_result("everything is fine", &components(&["a"])),
            Err(GateParseError::NoJson)
        );
    }

    #[test]
    fn test_malformed() {
        let err = parse_gate_result(r#"{"components": {"a": {"is_acceptable": "maybe"}}}"#, &components(&["a"]))
            .unwrap_err();
        assert!(matches!(err, GateParseError::Malformed(_)));
    }
}
