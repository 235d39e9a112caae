//! Gated fanout engine parameters.

use council_domain::PlanParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loop and dispatch control for one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    /// Refinement cycles allowed after a failing gate.
    pub max_refinement_rounds: u32,
    /// Bound on each agent, gate and synthesis node run.
    pub agent_timeout: Duration,
    /// Plan sizing handed to the compiler.
    pub plan: PlanParams,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_refinement_rounds: 3,
            agent_timeout: Duration::from_secs(300),
            plan: PlanParams::default(),
        }
    }
}

impl EngineParams {
    pub fn with_max_refinement_rounds(mut self, rounds: u32) -> Self {
        self.max_refinement_rounds = rounds;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_plan(mut self, plan: PlanParams) -> Self {
        self.plan = plan;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = EngineParams::default();
        assert_eq!(params.max_refinement_rounds, 3);
        assert_eq!(params.plan.domains_per_agent, 2);
    }
}
