//! Reasoning backend backed by an external command

use super::runner::{CommandError, CommandRunner};
use async_trait::async_trait;
use council_application::{BackendError, Invocation, ReasoningBackend};
use council_domain::{EvaluatorConfig, parse_evaluation};
use tracing::{debug, warn};

/// Rough characters-per-token ratio for cost estimates
const CHARS_PER_TOKEN: f64 = 4.0;

/// Sends each evaluation prompt to a command and parses its stdout.
///
/// The evaluator name is exported as `AGENT_COUNCIL_EVALUATOR` so a wrapper
/// script can route evaluators to different models.
pub struct CommandReasoningBackend {
    runner: CommandRunner,
    price_per_1k_tokens: f64,
}

impl CommandReasoningBackend {
    pub fn new(runner: CommandRunner, price_per_1k_tokens: f64) -> Self {
        Self {
            runner,
            price_per_1k_tokens,
        }
    }

    fn estimate_cost(&self, prompt: &str, response: &str) -> f64 {
        let tokens = (prompt.chars().count() + response.chars().count()) as f64 / CHARS_PER_TOKEN;
        tokens / 1000.0 * self.price_per_1k_tokens
    }
}

#[async_trait]
impl ReasoningBackend for CommandReasoningBackend {
    async fn invoke(
        &self,
        evaluator: &EvaluatorConfig,
        prompt: &str,
    ) -> Result<Invocation, BackendError> {
        let response = self
            .runner
            .run(prompt, &[("AGENT_COUNCIL_EVALUATOR", &evaluator.name)])
            .await
            .map_err(|e| match e {
                CommandError::NotFound(program) => {
                    BackendError::Unavailable(format!("'{program}' is not installed"))
                }
                other => BackendError::RequestFailed(other.to_string()),
            })?;

        let cost = self.estimate_cost(prompt, &response);
        let evaluation = parse_evaluation(&response).map_err(|e| {
            warn!(evaluator = %evaluator.name, error = %e, cost, "Unparsable evaluation");
            BackendError::Malformed {
                reason: e.to_string(),
                cost,
            }
        })?;

        debug!(evaluator = %evaluator.name, cost, "Evaluation received");
        Ok(Invocation::new(evaluation, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Complexity;

    const ANSWER: &str = r#"{"complexity":"medium","complexity_reason":"","total_agents":3,"agent_reason":"","rounds_needed":1,"role_priorities":["implementer"],"primary_domains":["api"],"domain_reason":"","workflow_pattern":"parallel","workflow_reason":"","quality_level":"basic","quality_reason":"","rules_applied":[],"confidence":0.7,"summary":"ok"}"#;

    fn backend(script: &str, price: f64) -> CommandReasoningBackend {
        CommandReasoningBackend::new(
            CommandRunner::new("sh", vec!["-c".to_string(), script.to_string()]),
            price,
        )
    }

    #[tokio::test]
    async fn test_parses_command_output() {
        let script = format!("cat >/dev/null; printf '%s' '{ANSWER}'");
        let invocation = backend(&script, 1.0)
            .invoke(&EvaluatorConfig::new("pragmatist", ""), "prompt")
            .await
            .unwrap();
        assert_eq!(invocation.evaluation.complexity, Complexity::Medium);
        assert!(invocation.cost > 0.0);
    }

    #[tokio::test]
    async fn test_zero_price_costs_nothing() {
        let script = format!("cat >/dev/null; printf '%s' '{ANSWER}'");
        let invocation = backend(&script, 0.0)
            .invoke(&EvaluatorConfig::new("a", ""), "prompt")
            .await
            .unwrap();
        assert_eq!(invocation.cost, 0.0);
    }

    #[tokio::test]
    async fn test_prose_is_malformed_but_billed() {
        let result = backend("cat >/dev/null; echo 'I think it is hard'", 1.0)
            .invoke(&EvaluatorConfig::new("a", ""), "prompt")
            .await;
        match result {
            Err(BackendError::Malformed { cost, .. }) => assert!(cost > 0.0),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let backend = CommandReasoningBackend::new(
            CommandRunner::new("agent-council-no-such-binary", vec![]),
            0.0,
        );
        let result = backend.invoke(&EvaluatorConfig::new("a", ""), "p").await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_evaluator_name_is_exported() {
        let script = format!(
            "cat >/dev/null; [ \"$AGENT_COUNCIL_EVALUATOR\" = skeptic ] && printf '%s' '{ANSWER}'"
        );
        let result = backend(&script, 0.0)
            .invoke(&EvaluatorConfig::new("skeptic", ""), "p")
            .await;
        assert!(result.is_ok());
    }
}
