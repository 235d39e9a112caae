//! Results flowing out of the workflow graph

use super::ids::NodeId;
use super::state::ExecutionState;
use crate::consensus::Consensus;
use serde::{Deserialize, Serialize};

/// Result of running one graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum NodeOutcome {
    Completed(String),
    Failed(String),
}

impl NodeOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, NodeOutcome::Completed(_))
    }
}

/// What one agent produced, or a placeholder explaining why it did not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Position of the request within its plan
    pub index: usize,
    pub role: String,
    pub domains: Vec<String>,
    /// 0 for the initial fanout, n for the n-th refinement round
    pub round: u32,
    pub node_id: Option<NodeId>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl AgentOutput {
    pub fn completed(
        index: usize,
        role: impl Into<String>,
        domains: Vec<String>,
        round: u32,
        node_id: NodeId,
        output: String,
    ) -> Self {
        Self {
            index,
            role: role.into(),
            domains,
            round,
            node_id: Some(node_id),
            output: Some(output),
            error: None,
        }
    }

    pub fn placeholder(
        index: usize,
        role: impl Into<String>,
        domains: Vec<String>,
        round: u32,
        node_id: Option<NodeId>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            role: role.into(),
            domains,
            round,
            node_id,
            output: None,
            error: Some(error.into()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.output.is_none()
    }

    /// Author label for prompts, e.g. `tester (round 1)`
    pub fn author(&self) -> String {
        if self.round == 0 {
            self.role.clone()
        } else {
            format!("{} (round {})", self.role, self.round)
        }
    }

    /// Text shown to downstream nodes
    pub fn content(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) => output.clone(),
            (None, Some(error)) => format!("[no output: {error}]"),
            (None, None) => "[no output]".to_string(),
        }
    }
}

/// Terminal result of a successful gated fanout run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanoutWithGatedRefinementResponse {
    pub synth_result: String,
    pub gate_passed: bool,
    pub refinement_executed: bool,
    pub synth_node_id: NodeId,
    /// Absent when no gate was configured
    pub final_gate_id: Option<NodeId>,
    pub initial_node_ids: Vec<NodeId>,
    pub refinement_rounds: u32,
    pub consensus: Consensus,
    pub outputs: Vec<AgentOutput>,
    pub warnings: Vec<String>,
    pub state_history: Vec<ExecutionState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_content() {
        let output = AgentOutput::placeholder(0, "tester", vec![], 1, None, "timed out");
        assert!(output.is_placeholder());
        assert_eq!(output.content(), "[no output: timed out]");
        assert_eq!(output.author(), "tester (round 1)");
    }

    #[test]
    fn test_completed_content() {
        let output = AgentOutput::completed(0, "tester", vec![], 0, NodeId::new("n1"), "ok".into());
        assert!(!output.is_placeholder());
        assert_eq!(output.content(), "ok");
        assert_eq!(output.author(), "tester");
    }

    #[test]
    fn test_node_outcome_wire_shape() {
        let json = serde_json::to_string(&NodeOutcome::Failed("boom".into())).unwrap();
        assert_eq!(json, r#"{"status":"failed","value":"boom"}"#);
    }
}
