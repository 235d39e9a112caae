//! Workflow graph executor that runs each node as an external command
//!
//! The graph lives in memory. A node's input is its branch persona, the
//! outputs of its completed dependencies (truncated) and its instruction.

use super::runner::{CommandError, CommandRunner};
use async_trait::async_trait;
use council_application::{ExecutorError, WorkflowGraphExecutor};
use council_domain::core::string::truncate;
use council_domain::{BranchId, NodeId, NodeOutcome};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Per-dependency cap on text fed into a dependent node
const DEFAULT_DEPENDENCY_CHARS: usize = 4000;

#[derive(Debug, Clone)]
enum NodeState {
    Pending,
    Running,
    Done(NodeOutcome),
}

#[derive(Debug)]
struct Node {
    id: NodeId,
    branch: BranchId,
    instruction: String,
    depends_on: Vec<NodeId>,
    state: NodeState,
}

#[derive(Debug, Default)]
struct Graph {
    branches: HashMap<BranchId, String>,
    /// Insertion order; dependencies always precede their dependents
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Indices of `requested` plus their pending ancestors, ascending
    fn pending_closure(&self, requested: &[NodeId]) -> Vec<usize> {
        let mut marked = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = requested
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .collect();
        while let Some(i) = stack.pop() {
            if marked[i] || !matches!(self.nodes[i].state, NodeState::Pending) {
                continue;
            }
            marked[i] = true;
            stack.extend(
                self.nodes[i]
                    .depends_on
                    .iter()
                    .filter_map(|d| self.index.get(d).copied()),
            );
        }
        (0..self.nodes.len()).filter(|&i| marked[i]).collect()
    }
}

pub struct CommandWorkflowExecutor {
    runner: CommandRunner,
    graph: Mutex<Graph>,
    dependency_chars: usize,
}

impl CommandWorkflowExecutor {
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            graph: Mutex::new(Graph::default()),
            dependency_chars: DEFAULT_DEPENDENCY_CHARS,
        }
    }

    pub fn with_dependency_chars(mut self, chars: usize) -> Self {
        self.dependency_chars = chars;
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Graph>, ExecutorError> {
        self.graph
            .lock()
            .map_err(|_| ExecutorError::Operation("workflow graph lock poisoned".to_string()))
    }

    /// Claim a pending node and build its input. `None` if another run got
    /// there first.
    fn claim(&self, index: usize) -> Result<Option<(NodeId, String)>, ExecutorError> {
        let mut graph = self.lock()?;
        if !matches!(graph.nodes[index].state, NodeState::Pending) {
            return Ok(None);
        }

        let node = &graph.nodes[index];
        let persona = graph.branches.get(&node.branch).cloned().unwrap_or_default();
        let mut input = persona;

        let upstream: Vec<String> = node
            .depends_on
            .iter()
            .filter_map(|dep| match graph.node(dep).map(|n| &n.state) {
                Some(NodeState::Done(NodeOutcome::Completed(text))) => Some(format!(
                    "--- {} ---\n{}",
                    dep,
                    truncate(text, self.dependency_chars)
                )),
                _ => None,
            })
            .collect();
        if !upstream.is_empty() {
            input.push_str("\n\n## Upstream results\n\n");
            input.push_str(&upstream.join("\n\n"));
        }
        input.push_str("\n\n");
        input.push_str(&node.instruction);

        let id = node.id.clone();
        graph.nodes[index].state = NodeState::Running;
        Ok(Some((id, input)))
    }

    fn finish(&self, index: usize, outcome: NodeOutcome) -> Result<(), ExecutorError> {
        self.lock()?.nodes[index].state = NodeState::Done(outcome);
        Ok(())
    }
}

#[async_trait]
impl WorkflowGraphExecutor for CommandWorkflowExecutor {
    async fn create_branch(&self, persona: &str) -> Result<BranchId, ExecutorError> {
        if !self.runner.is_available() {
            return Err(ExecutorError::Unavailable(format!(
                "'{}' is not installed",
                self.runner.program()
            )));
        }

        let mut graph = self.lock()?;
        let id = BranchId::new(format!("branch-{}", graph.branches.len() + 1));
        graph.branches.insert(id.clone(), persona.to_string());
        Ok(id)
    }

    async fn add_operation(
        &self,
        branch: &BranchId,
        instruction: &str,
        depends_on: &[NodeId],
    ) -> Result<NodeId, ExecutorError> {
        let mut graph = self.lock()?;
        if !graph.branches.contains_key(branch) {
            return Err(ExecutorError::Operation(format!("unknown branch {branch}")));
        }
        if let Some(missing) = depends_on.iter().find(|d| !graph.index.contains_key(*d)) {
            return Err(ExecutorError::Operation(format!("unknown dependency {missing}")));
        }

        let id = NodeId::new(format!("node-{}", graph.nodes.len() + 1));
        let position = graph.nodes.len();
        graph.nodes.push(Node {
            id: id.clone(),
            branch: branch.clone(),
            instruction: instruction.to_string(),
            depends_on: depends_on.to_vec(),
            state: NodeState::Pending,
        });
        graph.index.insert(id.clone(), position);
        Ok(id)
    }

    async fn run(&self, nodes: &[NodeId]) -> Result<HashMap<NodeId, NodeOutcome>, ExecutorError> {
        let order = {
            let graph = self.lock()?;
            if let Some(missing) = nodes.iter().find(|n| !graph.index.contains_key(*n)) {
                return Err(ExecutorError::Operation(format!("unknown node {missing}")));
            }
            graph.pending_closure(nodes)
        };

        for index in order {
            let Some((id, input)) = self.claim(index)? else {
                continue;
            };
            debug!(node = %id, "Running node");

            let outcome = match self.runner.run(&input, &[("AGENT_COUNCIL_NODE", id.as_str())]).await {
                Ok(text) => NodeOutcome::Completed(text.trim().to_string()),
                Err(CommandError::NotFound(program)) => {
                    self.finish(index, NodeOutcome::Failed("executor unavailable".to_string()))?;
                    return Err(ExecutorError::Unavailable(format!(
                        "'{program}' is not installed"
                    )));
                }
                Err(e) => {
                    warn!(node = %id, error = %e, "Node failed");
                    NodeOutcome::Failed(e.to_string())
                }
            };
            self.finish(index, outcome)?;
        }

        let graph = self.lock()?;
        Ok(nodes
            .iter()
            .filter_map(|id| {
                let node = graph.node(id)?;
                let outcome = match &node.state {
                    NodeState::Done(outcome) => outcome.clone(),
                    _ => NodeOutcome::Failed("node was interrupted".to_string()),
                };
                Some((id.clone(), outcome))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(script: &str) -> CommandWorkflowExecutor {
        CommandWorkflowExecutor::new(CommandRunner::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
        ))
    }

    fn completed(outcome: Option<&NodeOutcome>) -> &str {
        match outcome {
            Some(NodeOutcome::Completed(text)) => text,
            other => panic!("expected completed node, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_node_runs_with_persona() {
        let executor = executor("cat");
        let branch = executor.create_branch("You are a tester.").await.unwrap();
        let node = executor.add_operation(&branch, "Test it.", &[]).await.unwrap();

        let outcomes = executor.run(std::slice::from_ref(&node)).await.unwrap();
        let text = completed(outcomes.get(&node));
        assert!(text.starts_with("You are a tester."));
        assert!(text.ends_with("Test it."));
    }

    #[tokio::test]
    async fn test_pending_dependencies_run_first_and_feed_forward() {
        let executor = executor("cat");
        let a = executor.create_branch("A").await.unwrap();
        let b = executor.create_branch("B").await.unwrap();
        let first = executor.add_operation(&a, "first", &[]).await.unwrap();
        let second = executor
            .add_operation(&b, "second", std::slice::from_ref(&first))
            .await
            .unwrap();

        let outcomes = executor.run(std::slice::from_ref(&second)).await.unwrap();
        let text = completed(outcomes.get(&second));
        assert!(text.contains("Upstream results"));
        assert!(text.contains("first"));
        // only requested nodes are reported
        assert!(!outcomes.contains_key(&first));
    }

    #[tokio::test]
    async fn test_completed_nodes_are_not_rerun() {
        let executor = executor("cat >/dev/null; date +%s%N");
        let branch = executor.create_branch("p").await.unwrap();
        let node = executor.add_operation(&branch, "x", &[]).await.unwrap();

        let first = executor.run(std::slice::from_ref(&node)).await.unwrap();
        let second = executor.run(std::slice::from_ref(&node)).await.unwrap();
        assert_eq!(first.get(&node), second.get(&node));
    }

    #[tokio::test]
    async fn test_failing_command_is_failed_outcome() {
        let executor = executor("cat >/dev/null; exit 1");
        let branch = executor.create_branch("p").await.unwrap();
        let node = executor.add_operation(&branch, "x", &[]).await.unwrap();

        let outcomes = executor.run(std::slice::from_ref(&node)).await.unwrap();
        assert!(matches!(outcomes.get(&node), Some(NodeOutcome::Failed(_))));
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let executor =
            CommandWorkflowExecutor::new(CommandRunner::new("agent-council-no-such-binary", vec![]));
        let result = executor.create_branch("p").await;
        assert!(matches!(result, Err(ExecutorError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_references_are_rejected() {
        let executor = executor("cat");
        let missing = BranchId::new("branch-9");
        assert!(executor.add_operation(&missing, "x", &[]).await.is_err());

        let branch = executor.create_branch("p").await.unwrap();
        let result = executor
            .add_operation(&branch, "x", &[NodeId::new("node-9")])
            .await;
        assert!(matches!(result, Err(ExecutorError::Operation(_))));
    }

    #[tokio::test]
    async fn test_dependency_output_is_truncated() {
        let executor = executor("cat").with_dependency_chars(10);
        let branch = executor.create_branch("p").await.unwrap();
        let first = executor
            .add_operation(&branch, "abcdefghijklmnopqrstuvwxyz", &[])
            .await
            .unwrap();
        let second = executor
            .add_operation(&branch, "next", std::slice::from_ref(&first))
            .await
            .unwrap();

        let outcomes = executor.run(std::slice::from_ref(&second)).await.unwrap();
        let text = completed(outcomes.get(&second));
        assert!(!text.contains("abcdefghijklmnopqrstuvwxyz"));
        assert!(text.contains("..."));
    }
}
