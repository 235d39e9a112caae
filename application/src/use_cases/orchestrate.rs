//! Gated fanout execution engine
//!
//! Runs a task end to end: plan (triage, evaluators, consensus), compile,
//! fan the initial plan out, gate, refine a bounded number of times, and
//! synthesize. The upward `orchestrate` operation.
//!
//! Per-agent failures become placeholders. An unavailable executor, a plan
//! that cannot be compiled, cancellation and a failed synthesis end the run
//! in `FAILED`, returned as a [`RunFailure`] carrying everything produced so
//! far.

use crate::config::EngineParams;
use crate::ports::agent_composer::AgentComposer;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reasoning_backend::ReasoningBackend;
use crate::ports::workflow_executor::{ExecutorError, WorkflowGraphExecutor};
use crate::use_cases::plan_task::{PlanTaskError, PlanTaskInput, PlanTaskUseCase};
use crate::use_cases::shared::{Cancelled, check_cancelled};
use council_domain::{
    AgentOutput, Consensus, ExecutionEvent, ExecutionMachine, ExecutionState, ExecutionStrategy,
    FanoutWithGatedRefinementResponse, GateComponent, GateResult, InvalidTransition, NodeId,
    NodeOutcome, OrchestrationPlan, PlanCompilationError, PlanCompiler, ProjectPhase,
    PromptTemplate, QualityLevel, TaskDescription, parse_gate_result,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestrateError {
    #[error("Planning failed: {0}")]
    Planning(#[from] PlanTaskError),

    #[error("Plan compilation failed: {0}")]
    Compilation(#[from] PlanCompilationError),

    #[error("Workflow executor unavailable: {0}")]
    ExecutorUnavailable(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Internal state error: {0}")]
    State(#[from] InvalidTransition),

    #[error("Run cancelled")]
    Cancelled,
}

impl From<Cancelled> for OrchestrateError {
    fn from(_: Cancelled) -> Self {
        OrchestrateError::Cancelled
    }
}

/// Everything a failed run produced before it stopped
#[derive(Debug, Clone, Default)]
pub struct PartialRun {
    pub consensus: Option<Consensus>,
    pub outputs: Vec<AgentOutput>,
    pub last_gate: Option<GateResult>,
    pub state_history: Vec<ExecutionState>,
    pub warnings: Vec<String>,
}

/// Structured result of a failed run
#[derive(Error, Debug, Clone)]
#[error("run failed in {state}: {error}")]
pub struct RunFailure {
    /// State the run was in when the error happened
    pub state: ExecutionState,
    #[source]
    pub error: OrchestrateError,
    pub partial: PartialRun,
}

/// Input for the orchestrate operation
#[derive(Debug, Clone)]
pub struct OrchestrateInput {
    pub task: TaskDescription,
    pub context: Option<String>,
    /// Empty means the gate passes trivially
    pub gates: Vec<GateComponent>,
    pub project_phase: Option<ProjectPhase>,
    pub is_critical_path: bool,
}

impl OrchestrateInput {
    pub fn new(task: TaskDescription) -> Self {
        Self {
            task,
            context: None,
            gates: Vec::new(),
            project_phase: None,
            is_critical_path: false,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_gates(mut self, gates: Vec<GateComponent>) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_project_phase(mut self, phase: ProjectPhase) -> Self {
        self.project_phase = Some(phase);
        self
    }

    pub fn critical_path(mut self) -> Self {
        self.is_critical_path = true;
        self
    }
}

/// Mutable state of one run, owned by a single `orchestrate` call
struct Run {
    machine: ExecutionMachine,
    consensus: Option<Consensus>,
    outputs: Vec<AgentOutput>,
    /// Every node created so far, in creation order
    nodes: Vec<NodeId>,
    last_gate: Option<Arc<GateResult>>,
    warnings: Vec<String>,
}

impl Run {
    fn fail(mut self, error: OrchestrateError) -> RunFailure {
        let state = self.machine.state();
        if !state.is_terminal() {
            let _ = self.machine.advance(ExecutionEvent::Failed);
        }
        warn!(state = %state, error = %error, "Run failed");
        RunFailure {
            state,
            error,
            partial: PartialRun {
                consensus: self.consensus,
                outputs: self.outputs,
                last_gate: self.last_gate.map(|g| (*g).clone()),
                state_history: self.machine.history().to_vec(),
                warnings: self.warnings,
            },
        }
    }
}

/// Result of dispatching a single graph node
struct Dispatched {
    node_id: Option<NodeId>,
    result: Result<String, String>,
}

/// Use case for running a gated fanout
pub struct GatedFanoutEngine<B, E>
where
    B: ReasoningBackend + 'static,
    E: WorkflowGraphExecutor + 'static,
{
    planner: Arc<PlanTaskUseCase<B>>,
    executor: Arc<E>,
    composer: Arc<dyn AgentComposer>,
    compiler: PlanCompiler,
    params: EngineParams,
}

impl<B, E> GatedFanoutEngine<B, E>
where
    B: ReasoningBackend + 'static,
    E: WorkflowGraphExecutor + 'static,
{
    pub fn new(
        planner: Arc<PlanTaskUseCase<B>>,
        executor: Arc<E>,
        composer: Arc<dyn AgentComposer>,
        params: EngineParams,
    ) -> Self {
        Self {
            planner,
            executor,
            composer,
            compiler: PlanCompiler::new(params.plan.clone()),
            params,
        }
    }

    /// Execute with default (no-op) progress and no cancellation
    pub async fn execute(
        &self,
        input: OrchestrateInput,
    ) -> Result<FanoutWithGatedRefinementResponse, RunFailure> {
        self.execute_with_progress(input, &NoProgress, None).await
    }

    pub async fn execute_with_progress(
        &self,
        input: OrchestrateInput,
        progress: &dyn ProgressNotifier,
        cancellation: Option<CancellationToken>,
    ) -> Result<FanoutWithGatedRefinementResponse, RunFailure> {
        let mut run = Run {
            machine: ExecutionMachine::new(self.params.max_refinement_rounds),
            consensus: None,
            outputs: Vec::new(),
            nodes: Vec::new(),
            last_gate: None,
            warnings: Vec::new(),
        };
        progress.on_state_change(ExecutionState::Planning);

        match self.drive(&mut run, &input, progress, &cancellation).await {
            Ok(response) => Ok(response),
            Err(error) => {
                let failure = run.fail(error);
                progress.on_state_change(ExecutionState::Failed);
                Err(failure)
            }
        }
    }

    async fn drive(
        &self,
        run: &mut Run,
        input: &OrchestrateInput,
        progress: &dyn ProgressNotifier,
        cancellation: &Option<CancellationToken>,
    ) -> Result<FanoutWithGatedRefinementResponse, OrchestrateError> {
        let task = input.task.content();

        // PLANNING
        let mut plan_input = PlanTaskInput::new(input.task.clone());
        if let Some(context) = &input.context {
            plan_input = plan_input.with_context(context.clone());
        }
        let planned = self
            .planner
            .execute_with_progress(plan_input, progress, cancellation.clone())
            .await?;
        let mut consensus = planned.consensus;
        for failure in &planned.failures {
            run.warnings.push(format!("Evaluator dropped: {failure}"));
        }
        if input.is_critical_path {
            consensus.raise_quality(QualityLevel::Critical, "task is on the critical path");
        }
        run.consensus = Some(consensus.clone());

        let plans = self.compiler.compile(task, &consensus, input.project_phase)?;
        info!(
            plans = plans.len(),
            agents = plans.iter().map(OrchestrationPlan::len).sum::<usize>(),
            "Plan compiled"
        );
        self.advance(run, ExecutionEvent::PlanCompiled, progress)?;

        // INITIAL_EXEC
        let mut initial_node_ids = Vec::new();
        for plan in &plans {
            let label = plan
                .phase
                .map(|p| p.to_string())
                .unwrap_or_else(|| "initial".to_string());
            let created_before = run.nodes.len();
            self.run_plan(run, plan, &label, 0, progress, cancellation)
                .await?;
            initial_node_ids.extend(run.nodes[created_before..].iter().cloned());
        }
        self.advance(run, ExecutionEvent::InitialCompleted, progress)?;

        // GATE_EVAL / REFINEMENT_EXEC / RE_GATE_EVAL
        let mut final_gate_id = None;
        loop {
            check_cancelled(cancellation)?;
            let (gate_id, gate) = self
                .evaluate_gate(run, task, &input.gates, cancellation)
                .await?;
            if gate_id.is_some() {
                final_gate_id = gate_id;
            }
            info!(
                threshold_met = gate.threshold_met(),
                failing = gate.failing_components().count(),
                "Gate evaluated"
            );
            progress.on_gate_result(&gate);

            let gate = Arc::new(gate);
            run.last_gate = Some(Arc::clone(&gate));

            let next = self.advance(
                run,
                ExecutionEvent::GateEvaluated {
                    threshold_met: gate.threshold_met(),
                },
                progress,
            )?;
            if next != ExecutionState::RefinementExec {
                if !gate.threshold_met() {
                    warn!(
                        rounds = run.machine.refinement_rounds(),
                        "Refinement rounds exhausted; synthesizing without a passing gate"
                    );
                    run.warnings.push(format!(
                        "Quality gate still failing after {} refinement round(s)",
                        run.machine.refinement_rounds()
                    ));
                }
                break;
            }

            // Refinement reads an immutable snapshot of the gate it reacts to
            let snapshot = Arc::clone(&gate);
            let round = run.machine.refinement_rounds();
            let plan = self.compiler.compile_refinement(task, &consensus, &snapshot)?;
            self.run_plan(run, &plan, &format!("refinement {round}"), round, progress, cancellation)
                .await?;
            self.advance(run, ExecutionEvent::RefinementCompleted, progress)?;
        }

        // SYNTHESIS
        check_cancelled(cancellation)?;
        let gate_passed = run.machine.gate_passed();
        let (synth_node_id, synth_result) = self
            .synthesize(run, task, gate_passed, cancellation)
            .await?;
        self.advance(run, ExecutionEvent::SynthesisCompleted, progress)?;

        let mut warnings = consensus.warnings.clone();
        warnings.append(&mut run.warnings);

        info!(
            gate_passed,
            refinement_rounds = run.machine.refinement_rounds(),
            agents = run.outputs.len(),
            "Run complete"
        );

        Ok(FanoutWithGatedRefinementResponse {
            synth_result,
            gate_passed,
            refinement_executed: run.machine.refinement_executed(),
            synth_node_id,
            final_gate_id,
            initial_node_ids,
            refinement_rounds: run.machine.refinement_rounds(),
            consensus,
            outputs: std::mem::take(&mut run.outputs),
            warnings,
            state_history: run.machine.history().to_vec(),
        })
    }

    fn advance(
        &self,
        run: &mut Run,
        event: ExecutionEvent,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionState, OrchestrateError> {
        let from = run.machine.state();
        let next = run.machine.advance(event)?;
        debug!(from = %from, to = %next, "State transition");
        progress.on_state_change(next);
        Ok(next)
    }

    /// Dispatch every request of `plan` and append the outputs to `run`
    async fn run_plan(
        &self,
        run: &mut Run,
        plan: &OrchestrationPlan,
        label: &str,
        round: u32,
        progress: &dyn ProgressNotifier,
        cancellation: &Option<CancellationToken>,
    ) -> Result<(), OrchestrateError> {
        check_cancelled(cancellation)?;
        info!(
            plan = label,
            agents = plan.len(),
            strategy = %plan.execution_strategy,
            "Dispatching agents"
        );
        progress.on_agents_start(label, plan.len());

        // Personas are composed up front, in request order, so the composer's
        // de-duplication counter is deterministic
        let jobs: Vec<(String, String)> = plan
            .agent_requests
            .iter()
            .map(|request| {
                let persona = self
                    .composer
                    .compose(&request.role, &request.domains, &request.context);
                let instruction = format!("{}\n\n{}", request.context, request.instruction);
                (persona, instruction)
            })
            .collect();
        let depends_on = run.nodes.clone();

        let dispatched: Vec<(usize, Dispatched)> = match plan.execution_strategy {
            ExecutionStrategy::Concurrent => {
                self.dispatch_concurrent(jobs, depends_on, cancellation)
                    .await?
            }
            ExecutionStrategy::Sequential => {
                let mut results = Vec::with_capacity(jobs.len());
                let mut chain = depends_on;
                for (index, (persona, instruction)) in jobs.into_iter().enumerate() {
                    check_cancelled(cancellation)?;
                    let outcome = self
                        .dispatch_cancellable(persona, instruction, chain.clone(), cancellation)
                        .await?;
                    if let Some(node) = &outcome.node_id {
                        chain.push(node.clone());
                    }
                    results.push((index, outcome));
                }
                results
            }
        };

        for (index, outcome) in dispatched {
            let request = &plan.agent_requests[index];
            if let Some(node) = &outcome.node_id {
                run.nodes.push(node.clone());
            }
            let output = match (outcome.result, outcome.node_id) {
                (Ok(text), Some(node)) => {
                    debug!(agent = %request.label(), node = %node, "Agent completed");
                    AgentOutput::completed(
                        index,
                        &request.role,
                        request.domains.clone(),
                        round,
                        node,
                        text,
                    )
                }
                (result, node) => {
                    let error = result.err().unwrap_or_else(|| "no node created".to_string());
                    warn!(agent = %request.label(), error = %error, "Agent produced no output");
                    run.warnings
                        .push(format!("Agent {} failed: {}", request.label(), error));
                    AgentOutput::placeholder(
                        index,
                        &request.role,
                        request.domains.clone(),
                        round,
                        node,
                        error,
                    )
                }
            };
            progress.on_agent_complete(&request.label(), !output.is_placeholder());
            run.outputs.push(output);
        }

        Ok(())
    }

    async fn dispatch_concurrent(
        &self,
        jobs: Vec<(String, String)>,
        depends_on: Vec<NodeId>,
        cancellation: &Option<CancellationToken>,
    ) -> Result<Vec<(usize, Dispatched)>, OrchestrateError> {
        let mut join_set = JoinSet::new();
        // Task id -> (request index, node the task created), so a crashed agent still
        // leaves a placeholder behind
        let mut slots: HashMap<Id, (usize, Arc<OnceLock<NodeId>>)> = HashMap::new();
        for (index, (persona, instruction)) in jobs.into_iter().enumerate() {
            let executor = Arc::clone(&self.executor);
            let depends_on = depends_on.clone();
            let timeout = self.params.agent_timeout;
            let created = Arc::new(OnceLock::new());
            let task_created = Arc::clone(&created);
            let handle = join_set.spawn(async move {
                Self::dispatch(
                    executor,
                    persona,
                    instruction,
                    depends_on,
                    timeout,
                    &task_created,
                )
                .await
            });
            slots.insert(handle.id(), (index, created));
        }

        let mut results = Vec::new();
        loop {
            let joined = if let Some(token) = cancellation {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        return Err(OrchestrateError::Cancelled);
                    }
                    result = join_set.join_next_with_id() => result,
                }
            } else {
                join_set.join_next_with_id().await
            };

            let Some(joined) = joined else { break };
            match joined {
                Ok((id, Ok(outcome))) => {
                    if let Some((index, _)) = slots.remove(&id) {
                        results.push((index, outcome));
                    }
                }
                Ok((_, Err(error))) => {
                    join_set.abort_all();
                    return Err(unavailable(error));
                }
                Err(e) => {
                    let Some((index, created)) = slots.remove(&e.id()) else {
                        warn!("Agent task join error: {}", e);
                        continue;
                    };
                    warn!(index, error = %e, "Agent task crashed");
                    results.push((
                        index,
                        Dispatched {
                            node_id: created.get().cloned(),
                            result: Err(format!("agent task crashed: {e}")),
                        },
                    ));
                }
            }
        }

        results.sort_by_key(|(index, _)| *index);
        Ok(results)
    }

    /// [`Self::dispatch`] raced against the run's cancellation token
    async fn dispatch_cancellable(
        &self,
        persona: String,
        instruction: String,
        depends_on: Vec<NodeId>,
        cancellation: &Option<CancellationToken>,
    ) -> Result<Dispatched, OrchestrateError> {
        let created = OnceLock::new();
        let dispatch = Self::dispatch(
            Arc::clone(&self.executor),
            persona,
            instruction,
            depends_on,
            self.params.agent_timeout,
            &created,
        );
        match cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(OrchestrateError::Cancelled),
                outcome = dispatch => outcome.map_err(unavailable),
            },
            None => dispatch.await.map_err(unavailable),
        }
    }

    /// Branch, add and run one node. Only `Unavailable` is returned as an
    /// error; everything else is folded into the outcome. The node id is
    /// published to `created` as soon as it exists.
    async fn dispatch(
        executor: Arc<E>,
        persona: String,
        instruction: String,
        depends_on: Vec<NodeId>,
        timeout: Duration,
        created: &OnceLock<NodeId>,
    ) -> Result<Dispatched, ExecutorError> {
        let failed = |node_id: Option<NodeId>, error: String| Dispatched {
            node_id,
            result: Err(error),
        };

        let branch = match executor.create_branch(&persona).await {
            Ok(branch) => branch,
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => return Ok(failed(None, e.to_string())),
        };
        let node = match executor.add_operation(&branch, &instruction, &depends_on).await {
            Ok(node) => node,
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => return Ok(failed(None, e.to_string())),
        };
        let _ = created.set(node.clone());

        let outcome =
            tokio::time::timeout(timeout, executor.run(std::slice::from_ref(&node))).await;
        Ok(match outcome {
            Err(_) => failed(
                Some(node),
                format!("timed out after {}s", timeout.as_secs()),
            ),
            Ok(Err(e)) if e.is_unavailable() => return Err(e),
            Ok(Err(e)) => failed(Some(node), e.to_string()),
            Ok(Ok(mut outcomes)) => match outcomes.remove(&node) {
                Some(NodeOutcome::Completed(text)) => Dispatched {
                    node_id: Some(node),
                    result: Ok(text),
                },
                Some(NodeOutcome::Failed(error)) => failed(Some(node), error),
                None => failed(Some(node), "executor reported no outcome".to_string()),
            },
        })
    }

    /// Run the gate node. Any failure short of an unavailable executor
    /// yields a conservative, all-failing verdict.
    async fn evaluate_gate(
        &self,
        run: &mut Run,
        task: &str,
        gates: &[GateComponent],
        cancellation: &Option<CancellationToken>,
    ) -> Result<(Option<NodeId>, GateResult), OrchestrateError> {
        if gates.is_empty() {
            debug!("No gate components configured; gate passes trivially");
            return Ok((None, GateResult::trivial_pass()));
        }

        let outputs = authored(&run.outputs);
        let instruction = PromptTemplate::gate_prompt(task, gates, &outputs);
        let dispatched = self
            .dispatch_cancellable(
                PromptTemplate::gate_persona().to_string(),
                instruction,
                run.nodes.clone(),
                cancellation,
            )
            .await?;

        let result = match dispatched.result {
            Ok(answer) => match parse_gate_result(&answer, gates) {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "Gate answer unusable; treating as failed");
                    run.warnings.push(format!("Gate answer unusable: {e}"));
                    GateResult::failed_evaluation(gates, e.to_string())
                }
            },
            Err(error) => {
                warn!(error = %error, "Gate evaluation failed; treating as failed");
                run.warnings.push(format!("Gate evaluation failed: {error}"));
                GateResult::failed_evaluation(gates, error)
            }
        };

        Ok((dispatched.node_id, result))
    }

    async fn synthesize(
        &self,
        run: &mut Run,
        task: &str,
        gate_passed: bool,
        cancellation: &Option<CancellationToken>,
    ) -> Result<(NodeId, String), OrchestrateError> {
        let outputs = authored(&run.outputs);
        let agent_nodes: Vec<NodeId> = run
            .outputs
            .iter()
            .filter_map(|o| o.node_id.clone())
            .collect();

        let dispatched = self
            .dispatch_cancellable(
                PromptTemplate::synthesis_persona().to_string(),
                PromptTemplate::synthesis_prompt(task, &outputs, gate_passed),
                agent_nodes,
                cancellation,
            )
            .await?;

        if let Some(node) = &dispatched.node_id {
            run.nodes.push(node.clone());
        }
        match (dispatched.node_id, dispatched.result) {
            (Some(node), Ok(text)) => Ok((node, text)),
            (_, Err(error)) => Err(OrchestrateError::SynthesisFailed(error)),
            (None, Ok(_)) => Err(OrchestrateError::SynthesisFailed(
                "no synthesis node created".to_string(),
            )),
        }
    }
}

fn unavailable(error: ExecutorError) -> OrchestrateError {
    match error {
        ExecutorError::Unavailable(reason) => OrchestrateError::ExecutorUnavailable(reason),
        other => OrchestrateError::ExecutorUnavailable(other.to_string()),
    }
}

fn authored(outputs: &[AgentOutput]) -> Vec<(String, String)> {
    outputs.iter().map(|o| (o.author(), o.content())).collect()
}
