//! Plan Task use case
//!
//! Triage → evaluator fanout → consensus. The upward `plan` operation.

use crate::ports::cost_tracker::CostTracker;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reasoning_backend::ReasoningBackend;
use crate::use_cases::evaluate::{EvaluatePoolError, EvaluationRequest, EvaluatorError, EvaluatorPool};
use crate::use_cases::shared::{Cancelled, check_cancelled};
use council_domain::{
    ComplexityTriage, Consensus, ConsensusBuilder, DomainError, EvaluatorResult, TaskDescription,
    TriageDecision,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors that can occur while planning a task
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanTaskError {
    #[error("No evaluators configured")]
    NoEvaluators,

    #[error("Only {succeeded} evaluator(s) succeeded; at least {required} required")]
    InsufficientEvaluators {
        succeeded: usize,
        required: usize,
        failures: Vec<EvaluatorError>,
    },

    #[error("Planning cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<EvaluatePoolError> for PlanTaskError {
    fn from(error: EvaluatePoolError) -> Self {
        match error {
            EvaluatePoolError::NoEvaluators => PlanTaskError::NoEvaluators,
            EvaluatePoolError::InsufficientEvaluators {
                succeeded,
                required,
                failures,
            } => PlanTaskError::InsufficientEvaluators {
                succeeded,
                required,
                failures,
            },
            EvaluatePoolError::Cancelled => PlanTaskError::Cancelled,
        }
    }
}

impl From<Cancelled> for PlanTaskError {
    fn from(_: Cancelled) -> Self {
        PlanTaskError::Cancelled
    }
}

/// Input for the PlanTask use case
#[derive(Debug, Clone)]
pub struct PlanTaskInput {
    pub task: TaskDescription,
    pub context: Option<String>,
}

impl PlanTaskInput {
    pub fn new(task: TaskDescription) -> Self {
        Self {
            task,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Consensus plus how it was reached
#[derive(Debug, Clone)]
pub struct PlanTaskOutput {
    pub consensus: Consensus,
    /// First-pass tier; reported, never applied over the consensus
    pub triage: TriageDecision,
    pub results: Vec<EvaluatorResult>,
    /// Evaluators dropped along the way
    pub failures: Vec<EvaluatorError>,
}

impl PlanTaskOutput {
    /// Whether triage and consensus disagree on complexity
    pub fn triage_disagrees(&self) -> bool {
        self.triage.tier != self.consensus.complexity
    }
}

/// Use case for turning a task into a consensus
pub struct PlanTaskUseCase<B: ReasoningBackend + 'static> {
    triage: ComplexityTriage,
    pool: EvaluatorPool<B>,
    builder: ConsensusBuilder,
    cost_tracker: Arc<dyn CostTracker>,
}

impl<B: ReasoningBackend + 'static> PlanTaskUseCase<B> {
    pub fn new(
        triage: ComplexityTriage,
        pool: EvaluatorPool<B>,
        builder: ConsensusBuilder,
        cost_tracker: Arc<dyn CostTracker>,
    ) -> Self {
        Self {
            triage,
            pool,
            builder,
            cost_tracker,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: PlanTaskInput) -> Result<PlanTaskOutput, PlanTaskError> {
        self.execute_with_progress(input, &NoProgress, None).await
    }

    /// Execute the use case with progress callbacks and cancellation
    pub async fn execute_with_progress(
        &self,
        input: PlanTaskInput,
        progress: &dyn ProgressNotifier,
        cancellation: Option<CancellationToken>,
    ) -> Result<PlanTaskOutput, PlanTaskError> {
        check_cancelled(&cancellation)?;

        let triage = self.triage.classify(input.task.content());
        info!(
            tier = %triage.tier,
            source = ?triage.source,
            matched = ?triage.matched,
            "Triage classified task"
        );

        let request = EvaluationRequest {
            task: input.task.content().to_string(),
            context: input.context,
            prior: Some(triage.tier),
        };
        let outcome = self
            .pool
            .evaluate_all(&request, progress, &cancellation)
            .await?;

        let budget = self.cost_tracker.snapshot();
        let consensus = self.builder.build(&outcome.results, budget)?;

        info!(
            complexity = %consensus.complexity,
            agents = consensus.agent_count,
            workflow = %consensus.workflow_pattern,
            quality = %consensus.quality_level,
            confidence = consensus.confidence,
            warnings = consensus.warnings.len(),
            "Consensus built"
        );
        if triage.tier != consensus.complexity {
            info!(
                triage = %triage.tier,
                consensus = %consensus.complexity,
                "Triage prior differs from consensus; keeping consensus"
            );
        }
        progress.on_consensus(&consensus);

        Ok(PlanTaskOutput {
            consensus,
            triage,
            results: outcome.results,
            failures: outcome.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluatorPoolParams;
    use crate::use_cases::evaluate::tests::{MockBackend, MockCostTracker, Scripted, evaluation};
    use council_domain::{Complexity, ConsensusParams, DecisionMatrix, EvaluatorConfig, TierRule};
    use std::sync::Mutex;
    use std::time::Duration;

    fn matrix() -> DecisionMatrix {
        DecisionMatrix {
            tiers: vec![TierRule {
                tier: Complexity::VeryComplex,
                indicators: vec!["distributed".into()],
                description: String::new(),
            }],
        }
    }

    fn use_case(backend: MockBackend, tracker: Arc<MockCostTracker>) -> PlanTaskUseCase<MockBackend> {
        let pool = EvaluatorPool::new(
            Arc::new(backend),
            tracker.clone(),
            EvaluatorPoolParams::default()
                .with_evaluators(vec![
                    EvaluatorConfig::new("a", "x"),
                    EvaluatorConfig::new("b", "y"),
                    EvaluatorConfig::new("c", "z"),
                ])
                .with_timeout(Duration::from_secs(5)),
        );
        PlanTaskUseCase::new(
            ComplexityTriage::new(matrix()).unwrap(),
            pool,
            ConsensusBuilder::new(ConsensusParams::default()),
            tracker,
        )
    }

    fn task(text: &str) -> TaskDescription {
        TaskDescription::try_new(text).unwrap()
    }

    #[tokio::test]
    async fn test_consensus_not_overridden_by_triage() {
        let backend = MockBackend::new()
            .with("a", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("b", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("c", Scripted::Answer(evaluation(Complexity::Medium, 3)));
        let uc = use_case(backend, Arc::new(MockCostTracker::default()));

        let output = uc
            .execute(PlanTaskInput::new(task("Build a distributed cache")))
            .await
            .unwrap();

        assert_eq!(output.triage.tier, Complexity::VeryComplex);
        assert_eq!(output.consensus.complexity, Complexity::Simple);
        assert!(output.triage_disagrees());
        assert_eq!(output.results.len(), 3);
    }

    #[tokio::test]
    async fn test_budget_pressure_reaches_consensus() {
        let backend = MockBackend::new()
            .with("a", Scripted::Answer(evaluation(Complexity::Complex, 8)))
            .with("b", Scripted::Answer(evaluation(Complexity::Complex, 8)))
            .with("c", Scripted::Answer(evaluation(Complexity::Complex, 8)));
        let tracker = Arc::new(MockCostTracker {
            spent: Mutex::new(0.0),
            budget: 0.03,
        });
        let uc = use_case(backend, tracker);

        let output = uc.execute(PlanTaskInput::new(task("Refactor"))).await.unwrap();

        // Three calls at 0.01 use the whole budget; the kept minimum bounds damping
        assert!(output.consensus.has_warning("Budget Pressure"));
        assert_eq!(output.consensus.agent_count, 8);
    }

    #[tokio::test]
    async fn test_insufficient_evaluators_surface() {
        let uc = use_case(MockBackend::new(), Arc::new(MockCostTracker::default()));
        let err = uc.execute(PlanTaskInput::new(task("Anything"))).await.unwrap_err();
        assert!(matches!(
            err,
            PlanTaskError::InsufficientEvaluators { succeeded: 0, required: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let uc = use_case(MockBackend::new(), Arc::new(MockCostTracker::default()));
        let token = CancellationToken::new();
        token.cancel();
        let err = uc
            .execute_with_progress(PlanTaskInput::new(task("x")), &NoProgress, Some(token))
            .await
            .unwrap_err();
        assert_eq!(err, PlanTaskError::Cancelled);
    }
}
