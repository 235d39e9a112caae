//! Multi-evaluator consensus domain
//!
//! Turns N independent, possibly conflicting evaluations into one
//! deterministic [`Consensus`]. Everything here is CPU-only and pure.

pub mod builder;
pub mod entities;
pub mod outlier;
pub mod scoring;
pub mod vote;

pub use builder::{BudgetSnapshot, ConsensusBuilder, ConsensusParams};
pub use entities::{Consensus, RoleRecommendation};
pub use outlier::{OutlierSplit, filter_upper_outliers, quartiles};
pub use scoring::{position_weight, rank_domains, score_roles};
pub use vote::{Tally, VoteOption, majority_vote};
