//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_composer;
pub mod cost_tracker;
pub mod progress;
pub mod reasoning_backend;
pub mod workflow_executor;
