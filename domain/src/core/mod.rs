//! Core domain concepts shared across all subdomains.
//!
//! - [`task::TaskDescription`] - a validated task to plan and execute
//! - [`error::DomainError`] - domain-level errors
//! - [`error::ConfigurationError`] - fatal startup configuration errors

pub mod error;
pub mod json;
pub mod string;
pub mod task;
