//! Workflow graph executor port
//!
//! The execution substrate agents run on. The engine only relies on this
//! contract, never on how the executor schedules nodes.

use async_trait::async_trait;
use council_domain::{BranchId, NodeId, NodeOutcome};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// The executor cannot run anything; fatal to the run
    #[error("Executor unavailable: {0}")]
    Unavailable(String),

    /// A single operation could not be set up or run
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl ExecutorError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ExecutorError::Unavailable(_))
    }
}

#[async_trait]
pub trait WorkflowGraphExecutor: Send + Sync {
    /// Open a branch whose operations run under `persona`
    async fn create_branch(&self, persona: &str) -> Result<BranchId, ExecutorError>;

    /// Add an operation to `branch` that may only start after `depends_on`
    async fn add_operation(
        &self,
        branch: &BranchId,
        instruction: &str,
        depends_on: &[NodeId],
    ) -> Result<NodeId, ExecutorError>;

    /// Run `nodes` (and anything they still need) and report each outcome
    async fn run(&self, nodes: &[NodeId]) -> Result<HashMap<NodeId, NodeOutcome>, ExecutorError>;
}
