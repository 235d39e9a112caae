//! Application-level configuration.
//!
//! - [`EvaluatorPoolParams`] - who evaluates, timeouts, quorum
//! - [`EngineParams`] - refinement rounds, agent timeout, plan sizing

pub mod engine_params;
pub mod evaluator_params;

pub use engine_params::EngineParams;
pub use evaluator_params::EvaluatorPoolParams;
