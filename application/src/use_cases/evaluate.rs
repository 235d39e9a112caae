//! Evaluator pool
//!
//! Fans a task out to every configured evaluator concurrently. Each call is
//! bounded by a timeout and fails in isolation; the batch only fails when
//! fewer than `quorum` evaluators succeed.

use crate::config::EvaluatorPoolParams;
use crate::ports::cost_tracker::CostTracker;
use crate::ports::progress::ProgressNotifier;
use crate::ports::reasoning_backend::{BackendError, Invocation, ReasoningBackend};
use crate::use_cases::shared::{Cancelled, check_cancelled};
use council_domain::{Complexity, EvaluatorConfig, EvaluatorResult, PromptTemplate};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a single evaluator produced nothing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    #[error("evaluator '{evaluator}' timed out after {}s", .after.as_secs())]
    Timeout { evaluator: String, after: Duration },

    #[error("evaluator '{evaluator}' failed: {source}")]
    Backend {
        evaluator: String,
        #[source]
        source: BackendError,
    },

    #[error("evaluator '{evaluator}' crashed: {reason}")]
    Crashed { evaluator: String, reason: String },
}

impl EvaluatorError {
    /// Cost the backend billed even though the evaluator produced nothing
    pub fn billed_cost(&self) -> Option<f64> {
        match self {
            EvaluatorError::Backend { source, .. } => source.billed_cost(),
            _ => None,
        }
    }
}

/// Batch-level evaluation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatePoolError {
    #[error("No evaluators configured")]
    NoEvaluators,

    #[error("Only {succeeded} evaluator(s) succeeded; at least {required} required")]
    InsufficientEvaluators {
        succeeded: usize,
        required: usize,
        failures: Vec<EvaluatorError>,
    },

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl From<Cancelled> for EvaluatePoolError {
    fn from(_: Cancelled) -> Self {
        EvaluatePoolError::Cancelled
    }
}

/// What one evaluator is asked
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    pub task: String,
    pub context: Option<String>,
    /// Triage tier handed to evaluators as a hint
    pub prior: Option<Complexity>,
}

/// Successful results plus the failures that were tolerated
#[derive(Debug, Clone)]
pub struct PoolOutcome {
    /// In evaluator configuration order
    pub results: Vec<EvaluatorResult>,
    pub failures: Vec<EvaluatorError>,
}

pub struct EvaluatorPool<B: ReasoningBackend + 'static> {
    backend: Arc<B>,
    cost_tracker: Arc<dyn CostTracker>,
    params: EvaluatorPoolParams,
}

impl<B: ReasoningBackend + 'static> EvaluatorPool<B> {
    pub fn new(
        backend: Arc<B>,
        cost_tracker: Arc<dyn CostTracker>,
        params: EvaluatorPoolParams,
    ) -> Self {
        Self {
            backend,
            cost_tracker,
            params,
        }
    }

    pub fn params(&self) -> &EvaluatorPoolParams {
        &self.params
    }

    /// Evaluate `request` with every configured evaluator.
    pub async fn evaluate_all(
        &self,
        request: &EvaluationRequest,
        progress: &dyn ProgressNotifier,
        cancellation: &Option<CancellationToken>,
    ) -> Result<PoolOutcome, EvaluatePoolError> {
        let evaluators = &self.params.evaluators;
        if evaluators.is_empty() {
            return Err(EvaluatePoolError::NoEvaluators);
        }
        check_cancelled(cancellation)?;

        info!(
            evaluators = evaluators.len(),
            quorum = self.params.quorum,
            prior = ?request.prior,
            "Dispatching evaluators"
        );
        progress.on_evaluation_start(evaluators.len());

        let task_prompt = PromptTemplate::evaluation_prompt(
            &request.task,
            request.context.as_deref(),
            request.prior,
            self.params.max_total_agents,
        );

        let mut join_set = JoinSet::new();
        // Task id -> (configuration index, evaluator name), so a crashed task is still accounted for
        let mut slots: HashMap<Id, (usize, String)> = HashMap::new();
        for (index, evaluator) in evaluators.iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let evaluator = evaluator.clone();
            let prompt = format!(
                "{}\n\n{}",
                PromptTemplate::evaluator_system(&evaluator.framing),
                task_prompt
            );
            let timeout = self.params.timeout;

            let name = evaluator.name.clone();
            let handle = join_set.spawn(async move {
                let started = Instant::now();
                let outcome = Self::invoke_one(&backend, &evaluator, &prompt, timeout).await;
                (evaluator, outcome, started.elapsed())
            });
            slots.insert(handle.id(), (index, name));
        }

        let mut succeeded: Vec<(usize, EvaluatorResult)> = Vec::new();
        let mut failures = Vec::new();

        loop {
            let joined = if let Some(token) = cancellation {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        return Err(EvaluatePoolError::Cancelled);
                    }
                    result = join_set.join_next_with_id() => result,
                }
            } else {
                join_set.join_next_with_id().await
            };

            let Some(joined) = joined else { break };
            match joined {
                Ok((id, (evaluator, Ok(invocation), latency))) => {
                    let Some((index, _)) = slots.remove(&id) else {
                        continue;
                    };
                    debug!(
                        evaluator = %evaluator.name,
                        cost = invocation.cost,
                        latency_ms = latency.as_millis() as u64,
                        "Evaluator responded"
                    );
                    self.cost_tracker.record(invocation.cost);
                    progress.on_evaluator_complete(&evaluator.name, true);
                    let evaluation = invocation
                        .evaluation
                        .normalized(self.params.max_total_agents);
                    succeeded.push((
                        index,
                        EvaluatorResult::new(evaluator, evaluation)
                            .with_cost(invocation.cost)
                            .with_latency(latency),
                    ));
                }
                Ok((id, (evaluator, Err(error), _))) => {
                    slots.remove(&id);
                    warn!(evaluator = %evaluator.name, error = %error, "Evaluator dropped");
                    if let Some(cost) = error.billed_cost() {
                        self.cost_tracker.record(cost);
                    }
                    progress.on_evaluator_complete(&evaluator.name, false);
                    failures.push(error);
                }
                Err(e) => {
                    let Some((_, evaluator)) = slots.remove(&e.id()) else {
                        warn!("Evaluator task join error: {}", e);
                        continue;
                    };
                    warn!(evaluator = %evaluator, error = %e, "Evaluator task crashed");
                    progress.on_evaluator_complete(&evaluator, false);
                    failures.push(EvaluatorError::Crashed {
                        evaluator,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Completion order is nondeterministic; consensus input must not be
        succeeded.sort_by_key(|(index, _)| *index);
        let results: Vec<EvaluatorResult> = succeeded.into_iter().map(|(_, r)| r).collect();

        info!(
            succeeded = results.len(),
            failed = failures.len(),
            "Evaluation complete"
        );

        if results.len() < self.params.quorum.max(1) {
            return Err(EvaluatePoolError::InsufficientEvaluators {
                succeeded: results.len(),
                required: self.params.quorum.max(1),
                failures,
            });
        }

        Ok(PoolOutcome { results, failures })
    }

    async fn invoke_one(
        backend: &B,
        evaluator: &EvaluatorConfig,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Invocation, EvaluatorError> {
        match tokio::time::timeout(timeout, backend.invoke(evaluator, prompt)).await {
            Ok(Ok(invocation)) => Ok(invocation),
            Ok(Err(source)) => Err(EvaluatorError::Backend {
                evaluator: evaluator.name.clone(),
                source,
            }),
            Err(_) => Err(EvaluatorError::Timeout {
                evaluator: evaluator.name.clone(),
                after: timeout,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use council_domain::{BudgetSnapshot, Evaluation};
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) enum Scripted {
        Answer(Evaluation),
        Hang,
        Fail(BackendError),
        Panic,
    }

    /// Backend answering per evaluator name
    pub(crate) struct MockBackend {
        pub(crate) answers: HashMap<String, Scripted>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl MockBackend {
        pub(crate) fn new() -> Self {
            Self {
                answers: HashMap::new(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with(mut self, evaluator: &str, answer: Scripted) -> Self {
            self.answers.insert(evaluator.to_string(), answer);
            self
        }
    }

    #[async_trait]
    impl ReasoningBackend for MockBackend {
        async fn invoke(
            &self,
            evaluator: &EvaluatorConfig,
            prompt: &str,
        ) -> Result<Invocation, BackendError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.answers.get(&evaluator.name) {
                Some(Scripted::Answer(evaluation)) => Ok(Invocation::new(evaluation.clone(), 0.01)),
                Some(Scripted::Fail(e)) => Err(e.clone()),
                Some(Scripted::Panic) => panic!("backend bug"),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(BackendError::Timeout)
                }
                None => Err(BackendError::Unavailable("no script".into())),
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct MockCostTracker {
        pub(crate) spent: Mutex<f64>,
        pub(crate) budget: f64,
    }

    impl CostTracker for MockCostTracker {
        fn record(&self, cost: f64) {
            *self.spent.lock().unwrap() += cost;
        }

        fn total(&self) -> f64 {
            *self.spent.lock().unwrap()
        }

        fn budget(&self) -> f64 {
            self.budget
        }
    }

    pub(crate) fn evaluation(complexity: Complexity, agents: u32) -> Evaluation {
        Evaluation::new(complexity)
            .with_total_agents(agents)
            .with_confidence(0.8)
            .with_roles(["implementer", "tester"])
            .with_domains(["api"])
    }

    fn pool(backend: MockBackend, quorum: usize) -> (EvaluatorPool<MockBackend>, Arc<MockCostTracker>) {
        let tracker = Arc::new(MockCostTracker::default());
        let params = EvaluatorPoolParams::default()
            .with_quorum(quorum)
            .with_timeout(Duration::from_secs(10));
        (
            EvaluatorPool::new(Arc::new(backend), tracker.clone(), params),
            tracker,
        )
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest {
            task: "Add rate limiting".into(),
            context: None,
            prior: Some(Complexity::Medium),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_of_five_time_out() {
        let backend = MockBackend::new()
            .with("efficiency", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("quality", Scripted::Hang)
            .with("risk", Scripted::Answer(evaluation(Complexity::Medium, 3)))
            .with("innovation", Scripted::Hang)
            .with("pragmatic", Scripted::Answer(evaluation(Complexity::Simple, 2)));
        let (pool, tracker) = pool(backend, 1);

        let outcome = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap();

        let names: Vec<_> = outcome.results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["efficiency", "risk", "pragmatic"]);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome
            .failures
            .iter()
            .all(|f| matches!(f, EvaluatorError::Timeout { .. })));
        assert!((tracker.total() - 0.03).abs() < 1e-9);

        let consensus = council_domain::ConsensusBuilder::default()
            .build(&outcome.results, BudgetSnapshot::unlimited())
            .unwrap();
        assert_eq!(consensus.complexity, Complexity::Simple);
        assert_eq!(consensus.evaluator_count, 3);
    }

    #[tokio::test]
    async fn test_quorum_not_met() {
        let backend = MockBackend::new()
            .with("efficiency", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("quality", Scripted::Fail(BackendError::Malformed {
                reason: "not json".into(),
                cost: 0.0,
            }));
        let (pool, _) = pool(backend, 3);

        let err = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap_err();
        match err {
            EvaluatePoolError::InsufficientEvaluators {
                succeeded, required, failures,
            } => {
                assert_eq!(succeeded, 1);
                assert_eq!(required, 3);
                assert_eq!(failures.len(), 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_answer_is_still_billed() {
        let backend = MockBackend::new()
            .with("efficiency", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with(
                "quality",
                Scripted::Fail(BackendError::Malformed {
                    reason: "prose".into(),
                    cost: 0.05,
                }),
            );
        let (pool, tracker) = pool(backend, 1);

        let outcome = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert!((tracker.total() - 0.06).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_crashed_evaluator_counts_as_failure() {
        let backend = MockBackend::new()
            .with("efficiency", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("quality", Scripted::Answer(evaluation(Complexity::Simple, 2)))
            .with("risk", Scripted::Panic);
        let (pool, _) = pool(backend, 3);

        let err = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap_err();
        match err {
            EvaluatePoolError::InsufficientEvaluators { succeeded, failures, .. } => {
                assert_eq!(succeeded, 2);
                // risk crashed; innovation and pragmatic have no script
                assert_eq!(failures.len(), 3);
                assert!(failures.iter().any(|f| matches!(
                    f,
                    EvaluatorError::Crashed { evaluator, .. } if evaluator == "risk"
                )));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_evaluators() {
        let tracker = Arc::new(MockCostTracker::default());
        let pool = EvaluatorPool::new(
            Arc::new(MockBackend::new()),
            tracker,
            EvaluatorPoolParams::default().with_evaluators(vec![]),
        );
        let err = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap_err();
        assert_eq!(err, EvaluatePoolError::NoEvaluators);
    }

    #[tokio::test]
    async fn test_results_are_normalized() {
        let backend = MockBackend::new().with(
            "efficiency",
            Scripted::Answer(evaluation(Complexity::Complex, 500).with_roles([" Tester ", "tester"])),
        );
        let (pool, _) = pool(backend, 1);

        let outcome = pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap();
        let evaluation = &outcome.results[0].evaluation;
        assert_eq!(evaluation.total_agents, 20);
        assert_eq!(evaluation.role_priorities, vec!["tester"]);
    }

    #[tokio::test]
    async fn test_prompt_carries_framing_and_prior() {
        let backend = Arc::new(
            MockBackend::new().with("efficiency", Scripted::Answer(evaluation(Complexity::Simple, 1))),
        );
        let pool = EvaluatorPool::new(
            backend.clone(),
            Arc::new(MockCostTracker::default()),
            EvaluatorPoolParams::default()
                .with_evaluators(vec![EvaluatorConfig::new("efficiency", "minimise cost")]),
        );

        pool.evaluate_all(&request(), &NoProgress, &None).await.unwrap();
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("minimise cost"));
        assert!(prompts[0].contains("\"medium\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_batch() {
        let backend = MockBackend::new()
            .with("efficiency", Scripted::Hang)
            .with("quality", Scripted::Hang);
        let (pool, _) = pool(backend, 1);
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let err = pool
            .evaluate_all(&request(), &NoProgress, &Some(token))
            .await
            .unwrap_err();
        assert_eq!(err, EvaluatePoolError::Cancelled);
    }
}
