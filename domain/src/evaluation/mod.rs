//! Evaluation domain
//!
//! The structured records evaluators produce, and how to read them from
//! model output.

pub mod entities;
pub mod parsing;
pub mod value_objects;

pub use entities::{Evaluation, EvaluatorConfig, EvaluatorResult};
pub use parsing::{EvaluationParseError, parse_evaluation};
pub use value_objects::{Complexity, QualityLevel, WorkflowPattern};
