//! Plan domain
//!
//! Agent requests, orchestration plans and the compiler that derives them
//! from a consensus.

pub mod compiler;
pub mod entities;

pub use compiler::{PlanCompilationError, PlanCompiler, PlanParams, component_role};
pub use entities::{AgentRequest, ExecutionStrategy, OrchestrationPlan, ProjectPhase};
