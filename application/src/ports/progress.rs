//! Progress notification port
//!
//! Defines the interface for reporting progress while planning and running.

use council_domain::{Consensus, ExecutionState, GateResult};

/// Callback for progress updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain log lines, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called when evaluators are dispatched
    fn on_evaluation_start(&self, total_evaluators: usize);

    /// Called when one evaluator finishes, successfully or not
    fn on_evaluator_complete(&self, evaluator: &str, success: bool);

    /// Called when the execution state machine enters `state`
    fn on_state_change(&self, state: ExecutionState);

    /// Called once the consensus is built
    fn on_consensus(&self, _consensus: &Consensus) {}

    /// Called when a batch of agents is dispatched
    fn on_agents_start(&self, _label: &str, _total_agents: usize) {}

    /// Called when one agent finishes, successfully or not
    fn on_agent_complete(&self, _label: &str, _success: bool) {}

    /// Called after each gate evaluation
    fn on_gate_result(&self, _result: &GateResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_evaluation_start(&self, _total_evaluators: usize) {}
    fn on_evaluator_complete(&self, _evaluator: &str, _success: bool) {}
    fn on_state_change(&self, _state: ExecutionState) {}
}
