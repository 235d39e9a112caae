//! Subprocess adapters
//!
//! Both the reasoning backend and the workflow executor talk to an external
//! command: the prompt goes to stdin, the answer comes back on stdout.

mod backend;
mod executor;
mod runner;

pub use backend::CommandReasoningBackend;
pub use executor::CommandWorkflowExecutor;
pub use runner::{CommandError, CommandRunner};
