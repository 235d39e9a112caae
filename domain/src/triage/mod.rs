//! Complexity triage domain
//!
//! A first-pass classifier used as a prior for the evaluator pool. It never
//! overrides a converged consensus.

pub mod classifier;
pub mod matrix;

pub use classifier::{ComplexityTriage, TriageDecision, TriageSource};
pub use matrix::{DecisionMatrix, TierRule};
