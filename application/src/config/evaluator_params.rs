//! Evaluator pool parameters.
//!
//! [`EvaluatorPoolParams`] controls who evaluates a task and how long they
//! get. These are application-layer concerns, not domain policy.

use council_domain::EvaluatorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorPoolParams {
    /// Evaluators in dispatch order; results keep this order.
    pub evaluators: Vec<EvaluatorConfig>,
    /// Per-evaluator call timeout.
    pub timeout: Duration,
    /// Minimum successful evaluations for a consensus.
    pub quorum: usize,
    /// Upper bound applied to every evaluation's `total_agents`.
    pub max_total_agents: u32,
}

impl Default for EvaluatorPoolParams {
    fn default() -> Self {
        Self {
            evaluators: EvaluatorConfig::default_pool(),
            timeout: Duration::from_secs(120),
            quorum: 1,
            max_total_agents: 20,
        }
    }
}

impl EvaluatorPoolParams {
    // ==================== Builder Methods ====================

    pub fn with_evaluators(mut self, evaluators: Vec<EvaluatorConfig>) -> Self {
        self.evaluators = evaluators;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_quorum(mut self, quorum: usize) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_max_total_agents(mut self, max: u32) -> Self {
        self.max_total_agents = max;
        self
    }
}
