//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod evaluate;
pub mod orchestrate;
pub mod plan_task;
pub mod shared;
