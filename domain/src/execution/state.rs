//! Execution state machine for one gated fanout run
//!
//! ```text
//! PLANNING → INITIAL_EXEC → GATE_EVAL ─┬─ pass ──────────────→ SYNTHESIS → DONE
//!                                     ├─ fail, rounds left → REFINEMENT_EXEC → RE_GATE_EVAL ─┐
//!                                     └─ fail, exhausted ──→ SYNTHESIS (forced)             │
//!                         RE_GATE_EVAL behaves like GATE_EVAL ◄─────────────────────────────┘
//! any non-terminal state → FAILED
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Planning,
    InitialExec,
    GateEval,
    RefinementExec,
    ReGateEval,
    Synthesis,
    Done,
    Failed,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Planning => "PLANNING",
            ExecutionState::InitialExec => "INITIAL_EXEC",
            ExecutionState::GateEval => "GATE_EVAL",
            ExecutionState::RefinementExec => "REFINEMENT_EXEC",
            ExecutionState::ReGateEval => "RE_GATE_EVAL",
            ExecutionState::Synthesis => "SYNTHESIS",
            ExecutionState::Done => "DONE",
            ExecutionState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Done | ExecutionState::Failed)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionEvent {
    PlanCompiled,
    InitialCompleted,
    GateEvaluated { threshold_met: bool },
    RefinementCompleted,
    SynthesisCompleted,
    Failed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transition from {from} on {event:?}")]
pub struct InvalidTransition {
    pub from: ExecutionState,
    pub event: ExecutionEvent,
}

/// Owns the state and the refinement-round budget of a single run
#[derive(Debug, Clone)]
pub struct ExecutionMachine {
    state: ExecutionState,
    rounds_remaining: u32,
    refinement_rounds: u32,
    last_gate_passed: Option<bool>,
    history: Vec<ExecutionState>,
}

impl ExecutionMachine {
    pub fn new(max_refinement_rounds: u32) -> Self {
        Self {
            state: ExecutionState::Planning,
            rounds_remaining: max_refinement_rounds,
            refinement_rounds: 0,
            last_gate_passed: None,
            history: vec![ExecutionState::Planning],
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.rounds_remaining
    }

    /// Refinement cycles entered so far
    pub fn refinement_rounds(&self) -> u32 {
        self.refinement_rounds
    }

    /// Every state entered, in order, starting with `PLANNING`
    pub fn history(&self) -> &[ExecutionState] {
        &self.history
    }

    /// Verdict of the most recent gate evaluation
    pub fn gate_passed(&self) -> bool {
        self.last_gate_passed.unwrap_or(false)
    }

    pub fn refinement_executed(&self) -> bool {
        self.visits(ExecutionState::RefinementExec) > 0
    }

    pub fn visits(&self, state: ExecutionState) -> usize {
        self.history.iter().filter(|s| **s == state).count()
    }

    /// Apply an event and return the new state
    pub fn advance(&mut self, event: ExecutionEvent) -> Result<ExecutionState, InvalidTransition> {
        use ExecutionEvent as E;
        use ExecutionState as S;

        let next = match (self.state, event) {
            (from, E::Failed) if !from.is_terminal() => S::Failed,
            (S::Planning, E::PlanCompiled) => S::InitialExec,
            (S::InitialExec, E::InitialCompleted) => S::GateEval,
            (S::GateEval | S::ReGateEval, E::GateEvaluated { threshold_met }) => {
                self.last_gate_passed = Some(threshold_met);
                if threshold_met || self.rounds_remaining == 0 {
                    S::Synthesis
                } else {
                    self.rounds_remaining -= 1;
                    self.refinement_rounds += 1;
                    S::RefinementExec
                }
            }
            (S::RefinementExec, E::RefinementCompleted) => S::ReGateEval,
            (S::Synthesis, E::SynthesisCompleted) => S::Done,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        self.state = next;
        self.history.push(next);
        Ok(next)
    }
}
