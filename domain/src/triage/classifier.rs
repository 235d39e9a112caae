//! Complexity triage: a cheap, deterministic first guess at task complexity.
//!
//! Decision-matrix indicators win whenever any of them match. Otherwise a
//! small set of weighted patterns plus a length signal decides. Either way
//! ties go to the more complex tier and a task with no signal is `simple`.

use super::matrix::DecisionMatrix;
use crate::core::error::ConfigurationError;
use crate::evaluation::Complexity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Where a triage decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriageSource {
    Matrix,
    Heuristic,
}

/// Result of [`ComplexityTriage::classify`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub tier: Complexity,
    pub source: TriageSource,
    /// Indicator phrases or pattern hits that produced the tier
    pub matched: Vec<String>,
}

struct HeuristicPattern {
    tier: Complexity,
    regex: Regex,
    weight: usize,
}

static HEURISTICS: LazyLock<Vec<HeuristicPattern>> = LazyLock::new(|| {
    let table = [
        (
            Complexity::VeryComplex,
            r"\b(distributed|consensus|fault[- ]toleran\w*|multi[- ]region|real[- ]time|byzantine|shard\w*)\b",
            2,
        ),
        (
            Complexity::Complex,
            r"\b(architect\w*|microservices?|migrat\w*|security|authenticat\w*|scal\w+|concurren\w*|platform)\b",
            2,
        ),
        (
            Complexity::Medium,
            r"\b(api|endpoint|database|integrat\w*|refactor\w*|feature|service)\b",
            1,
        ),
        (
            Complexity::Simple,
            r"\b(typo|rename|fix\w*|format\w*|comment|readme|bump|small)\b",
            1,
        ),
    ];

    table
        .into_iter()
        .filter_map(|(tier, pattern, weight)| {
            Regex::new(pattern)
                .ok()
                .map(|regex| HeuristicPattern { tier, regex, weight })
        })
        .collect()
});

const LONG_TASK_WORDS: usize = 60;
const VERY_LONG_TASK_WORDS: usize = 150;

/// Deterministic complexity classifier
#[derive(Debug, Clone)]
pub struct ComplexityTriage {
    matrix: DecisionMatrix,
}

impl ComplexityTriage {
    /// Build a classifier from a decision matrix, validating it first
    pub fn new(matrix: DecisionMatrix) -> Result<Self, ConfigurationError> {
        Ok(Self {
            matrix: matrix.validated()?,
        })
    }

    pub fn matrix(&self) -> &DecisionMatrix {
        &self.matrix
    }

    /// Classify a task. Identical input always yields identical output.
    pub fn classify(&self, task: &str) -> TriageDecision {
        let lowered = task.to_lowercase();

        if let Some(decision) = self.classify_by_matrix(&lowered) {
            return decision;
        }
        Self::classify_by_heuristics(&lowered)
    }

    fn classify_by_matrix(&self, lowered: &str) -> Option<TriageDecision> {
        let mut best: Option<(Complexity, Vec<&str>)> = None;

        // Ascending tier order with `>=` so the more complex tier wins ties
        for tier in Complexity::ALL {
            let hits = self.matrix.matches(tier, lowered);
            if hits.is_empty() {
                continue;
            }
            if best.as_ref().is_none_or(|(_, b)| hits.len() >= b.len()) {
                best = Some((tier, hits));
            }
        }

        best.map(|(tier, hits)| TriageDecision {
            tier,
            source: TriageSource::Matrix,
            matched: hits.into_iter().map(str::to_string).collect(),
        })
    }

    fn classify_by_heuristics(lowered: &str) -> TriageDecision {
        let mut scores = [0usize; 4];
        let mut matched = Vec::new();

        for pattern in HEURISTICS.iter() {
            for hit in pattern.regex.find_iter(lowered) {
                scores[tier_index(pattern.tier)] += pattern.weight;
                matched.push(hit.as_str().to_string());
            }
        }

        let words = lowered.split_whitespace().count();
        if words >= VERY_LONG_TASK_WORDS {
            scores[tier_index(Complexity::VeryComplex)] += 1;
            matched.push(format!("{} words", words));
        } else if words >= LONG_TASK_WORDS {
            scores[tier_index(Complexity::Complex)] += 1;
            matched.push(format!("{} words", words));
        }

        let mut tier = Complexity::Simple;
        let mut best = 0;
        for candidate in Complexity::ALL {
            let score = scores[tier_index(candidate)];
            if score > 0 && score >= best {
                best = score;
                tier = candidate;
            }
        }

        TriageDecision {
            tier,
            source: TriageSource::Heuristic,
            matched,
        }
    }
}

fn tier_index(tier: Complexity) -> usize {
    match tier {
        Complexity::Simple => 0,
        Complexity::Medium => 1,
        Complexity::Complex => 2,
        Complexity::VeryComplex => 3,
    }
}
