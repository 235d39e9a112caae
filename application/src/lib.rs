//! Application layer for agent-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineParams, EvaluatorPoolParams};
pub use ports::{
    agent_composer::AgentComposer,
    cost_tracker::CostTracker,
    progress::{NoProgress, ProgressNotifier},
    reasoning_backend::{BackendError, Invocation, ReasoningBackend},
    workflow_executor::{ExecutorError, WorkflowGraphExecutor},
};
pub use use_cases::evaluate::{
    EvaluatePoolError, EvaluationRequest, EvaluatorError, EvaluatorPool, PoolOutcome,
};
pub use use_cases::orchestrate::{
    GatedFanoutEngine, OrchestrateError, OrchestrateInput, PartialRun, RunFailure,
};
pub use use_cases::plan_task::{PlanTaskError, PlanTaskInput, PlanTaskOutput, PlanTaskUseCase};
pub use use_cases::shared::Cancelled;
