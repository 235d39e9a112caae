//! Domain layer for agent-council
//!
//! Pure types and algorithms. No I/O, no async, no knowledge of how
//! evaluators are called or how agents are run.
//!
//! # Core Concepts
//!
//! ## Consensus
//!
//! Several evaluators independently assess a task ([`Evaluation`]). The
//! [`ConsensusBuilder`] reduces their answers to one deterministic
//! [`Consensus`]: majority votes for categorical fields, confidence-weighted
//! agent counts with outlier filtering, position-weighted role scores.
//!
//! ## Gated fanout
//!
//! The [`PlanCompiler`] turns a consensus into [`OrchestrationPlan`]s. Runs
//! move through the [`ExecutionMachine`]: initial fanout, a quality gate,
//! bounded refinement, synthesis.

pub mod config;
pub mod consensus;
pub mod core;
pub mod evaluation;
pub mod execution;
pub mod gate;
pub mod plan;
pub mod prompt;
pub mod triage;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, has_errors};
pub use consensus::{
    BudgetSnapshot, Consensus, ConsensusBuilder, ConsensusParams, RoleRecommendation,
};
pub use core::{
    error::{ConfigurationError, DomainError},
    task::TaskDescription,
};
pub use evaluation::{
    Complexity, Evaluation, EvaluationParseError, EvaluatorConfig, EvaluatorResult, QualityLevel,
    WorkflowPattern, parse_evaluation,
};
pub use execution::{
    AgentOutput, BranchId, ExecutionEvent, ExecutionMachine, ExecutionState,
    FanoutWithGatedRefinementResponse, InvalidTransition, NodeId, NodeOutcome,
};
pub use gate::{ComponentResult, GateComponent, GateParseError, GateResult, parse_gate_result};
pub use plan::{
    AgentRequest, ExecutionStrategy, OrchestrationPlan, PlanCompilationError, PlanCompiler,
    PlanParams, ProjectPhase,
};
pub use prompt::PromptTemplate;
pub use triage::{ComplexityTriage, DecisionMatrix, TierRule, TriageDecision, TriageSource};
