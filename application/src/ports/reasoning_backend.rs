//! Reasoning backend port
//!
//! Defines how evaluators are asked for a structured assessment.

use async_trait::async_trait;
use council_domain::{Evaluation, EvaluatorConfig};
use thiserror::Error;

/// Errors that can occur while invoking the reasoning backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The call completed and was billed, but its answer was unusable
    #[error("Malformed evaluation: {reason}")]
    Malformed { reason: String, cost: f64 },

    #[error("Timeout")]
    Timeout,
}

impl BackendError {
    /// Cost already incurred by the failed call, if the backend knows it
    pub fn billed_cost(&self) -> Option<f64> {
        match self {
            BackendError::Malformed { cost, .. } => Some(*cost),
            _ => None,
        }
    }
}

/// One successful backend call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub evaluation: Evaluation,
    /// Cost of the call in the tracker's currency
    pub cost: f64,
}

impl Invocation {
    pub fn new(evaluation: Evaluation, cost: f64) -> Self {
        Self { evaluation, cost }
    }
}

/// Backend that turns a prompt into an [`Evaluation`]
///
/// Implementations (adapters) live in the infrastructure layer. Callers
/// bound every call with their own timeout.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Ask `evaluator` to assess the task described by `prompt`
    async fn invoke(
        &self,
        evaluator: &EvaluatorConfig,
        prompt: &str,
    ) -> Result<Invocation, BackendError>;
}
