//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod command;
pub mod composer;
pub mod config;
pub mod cost;

// Re-export commonly used types
pub use command::{CommandError, CommandReasoningBackend, CommandRunner, CommandWorkflowExecutor};
pub use composer::TemplateAgentComposer;
pub use config::{
    ConfigLoadError, ConfigLoader, DEFAULT_DECISION_MATRIX, FileConfig, FileOutputConfig,
    load_decision_matrix,
};
pub use cost::InMemoryCostTracker;
