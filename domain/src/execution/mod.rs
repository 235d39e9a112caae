//! Execution domain
//!
//! The state machine a gated fanout run moves through, the identifiers of
//! the workflow graph, and what the run produces.

pub mod ids;
pub mod outputs;
pub mod state;

pub use ids::{BranchId, NodeId};
pub use outputs::{AgentOutput, FanoutWithGatedRefinementResponse, NodeOutcome};
pub use state::{ExecutionEvent, ExecutionMachine, ExecutionState, InvalidTransition};
