//! Consensus builder
//!
//! Reduces a batch of [`EvaluatorResult`]s to one [`Consensus`]. The build is
//! a pure function of its inputs: the same results and the same
//! [`BudgetSnapshot`] always produce the same consensus.
//!
//! Steps, in order:
//!
//! 1. Drop `total_agents` values above `Q3 + 1.5·IQR` (warned, not averaged)
//! 2. Complexity by majority vote
//! 3. Agent count: confidence-weighted mean of the kept values, damped under
//!    budget pressure
//! 4. Role recommendations by position-weighted scoring
//! 5. Domains by frequency
//! 6. Workflow pattern by majority vote
//! 7. Quality level by majority vote, escalated from `basic` to `thorough`
//!    when an auditor or a security-sensitive domain shows up
//! 8. Confidence: mean over all evaluators
//! 9. Efficiency-cliff and cost warnings

use super::entities::Consensus;
use super::outlier::filter_upper_outliers;
use super::scoring::{rank_domains, score_roles};
use super::vote::majority_vote;
use crate::core::error::DomainError;
use crate::evaluation::{EvaluatorResult, QualityLevel};
use serde::{Deserialize, Serialize};

/// Tunables for consensus building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Spend/budget ratio at which agent counts start being damped
    pub budget_pressure_ratio: f64,
    /// Multiplier applied to the agent count under budget pressure, in `(0, 1]`
    pub budget_damping_factor: f64,
    /// Agent counts above this get an efficiency-cliff warning
    pub efficiency_cliff_threshold: u32,
    /// Domain fragments that mark a task as security-sensitive
    pub security_domains: Vec<String>,
    /// Roles whose presence forces at least `thorough` quality
    pub escalation_roles: Vec<String>,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            budget_pressure_ratio: 0.8,
            budget_damping_factor: 0.75,
            efficiency_cliff_threshold: 12,
            security_domains: [
                "security",
                "authentication",
                "authorization",
                "cryptography",
                "compliance",
                "privacy",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            escalation_roles: vec!["auditor".to_string()],
        }
    }
}

impl ConsensusParams {
    fn is_security_domain(&self, domain: &str) -> bool {
        self.security_domains
            .iter()
            .any(|fragment| domain.contains(fragment.as_str()))
    }
}

/// Point-in-time view of the cost tracker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub spent: f64,
    /// Non-positive means "no budget configured"
    pub budget: f64,
}

impl BudgetSnapshot {
    pub fn new(spent: f64, budget: f64) -> Self {
        Self { spent, budget }
    }

    /// No budget configured
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Fraction of the budget spent, if a budget is configured
    pub fn ratio(&self) -> Option<f64> {
        (self.budget > 0.0).then(|| self.spent / self.budget)
    }

    pub fn is_under_pressure(&self, threshold: f64) -> bool {
        self.ratio().is_some_and(|r| r >= threshold)
    }

    pub fn is_over_budget(&self) -> bool {
        self.ratio().is_some_and(|r| r > 1.0)
    }
}

/// Builds a [`Consensus`] from evaluator results
#[derive(Debug, Clone, Default)]
pub struct ConsensusBuilder {
    params: ConsensusParams,
}

impl ConsensusBuilder {
    pub fn new(params: ConsensusParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Reduce evaluator results to one consensus.
    ///
    /// Fails only on empty input.
    pub fn build(
        &self,
        results: &[EvaluatorResult],
        budget: BudgetSnapshot,
    ) -> Result<Consensus, DomainError> {
        let evaluations: Vec<_> = results.iter().map(|r| &r.evaluation).collect();
        let mut warnings = Vec::new();

        // 1. Outliers
        let agent_values: Vec<u32> = evaluations.iter().map(|e| e.total_agents).collect();
        let split = filter_upper_outliers(&agent_values);
        for &i in &split.excluded {
            warnings.push(format!(
                "Outlier agent count {} from evaluator '{}' excluded (upper fence {:.2})",
                agent_values[i],
                results[i].name(),
                split.upper_fence.unwrap_or_default()
            ));
        }

        // 2. Complexity
        let complexity = majority_vote(evaluations.iter().map(|e| e.complexity))
            .ok_or(DomainError::NoEvaluations)?;
        if complexity.tied {
            warnings.push(format!(
                "Complexity vote tied; resolved alphabetically to {}",
                complexity.winner
            ));
        }

        // 3. Agent count
        let agent_count = self.agent_count(results, &split.kept, budget, &mut warnings);

        // 4–5. Roles and domains
        let role_recommendations = score_roles(
            evaluations.iter().map(|e| e.role_priorities.as_slice()),
            evaluations.len(),
        );
        let domains = rank_domains(evaluations.iter().map(|e| e.primary_domains.as_slice()));

        // 6. Workflow pattern
        let workflow = majority_vote(evaluations.iter().map(|e| e.workflow_pattern))
            .ok_or(DomainError::NoEvaluations)?;
        if workflow.tied {
            warnings.push(format!(
                "Workflow pattern vote tied; resolved alphabetically to {}",
                workflow.winner
            ));
        }

        // 7. Quality level with escalation
        let quality = majority_vote(evaluations.iter().map(|e| e.quality_level))
            .ok_or(DomainError::NoEvaluations)?;
        let mut quality_level = quality.winner;
        let needs_escalation = evaluations.iter().any(|e| {
            e.role_priorities
                .iter()
                .any(|r| self.params.escalation_roles.contains(r))
                || e.primary_domains
                    .iter()
                    .any(|d| self.params.is_security_domain(d))
        });
        if quality_level == QualityLevel::Basic && needs_escalation {
            quality_level = QualityLevel::Thorough;
            warnings.push(
                "Quality level auto-escalated from basic to thorough: auditor role or \
                 security-sensitive domain present"
                    .to_string(),
            );
        }

        // 8. Confidence over every evaluator, outliers included
        let confidence =
            evaluations.iter().map(|e| e.confidence).sum::<f64>() / evaluations.len() as f64;

        let rounds_needed = (evaluations
            .iter()
            .map(|e| f64::from(e.rounds_needed))
            .sum::<f64>()
            / evaluations.len() as f64)
            .round()
            .max(1.0) as u32;

        // 9. Meta-insights
        if agent_count > self.params.efficiency_cliff_threshold {
            warnings.push(format!(
                "Efficiency Cliff Warning: {} agents exceeds {}; coordination overhead \
                 is likely to outweigh parallel gains",
                agent_count, self.params.efficiency_cliff_threshold
            ));
        }
        if budget.is_over_budget() {
            warnings.push(format!(
                "Cost Warning: spend {:.4} exceeds budget {:.4}",
                budget.spent, budget.budget
            ));
        }

        Ok(Consensus {
            complexity: complexity.winner,
            agent_count,
            role_recommendations,
            domains,
            workflow_pattern: workflow.winner,
            quality_level,
            confidence,
            rounds_needed,
            evaluator_count: evaluations.len(),
            warnings,
        })
    }

    /// Confidence-weighted mean of the kept counts, clamped to their range,
    /// then damped under budget pressure (never below the kept minimum).
    fn agent_count(
        &self,
        results: &[EvaluatorResult],
        kept: &[usize],
        budget: BudgetSnapshot,
        warnings: &mut Vec<String>,
    ) -> u32 {
        let values: Vec<(f64, f64)> = kept
            .iter()
            .map(|&i| {
                let e = &results[i].evaluation;
                (f64::from(e.total_agents), e.confidence)
            })
            .collect();
        let min = kept
            .iter()
            .map(|&i| results[i].evaluation.total_agents)
            .min()
            .unwrap_or(1);
        let max = kept
            .iter()
            .map(|&i| results[i].evaluation.total_agents)
            .max()
            .unwrap_or(min);

        let weight_sum: f64 = values.iter().map(|(_, w)| w).sum();
        let mean = if weight_sum > 0.0 {
            values.iter().map(|(v, w)| v * w).sum::<f64>() / weight_sum
        } else {
            values.iter().map(|(v, _)| v).sum::<f64>() / values.len().max(1) as f64
        };
        let count = (mean.round() as u32).clamp(min, max);

        if !budget.is_under_pressure(self.params.budget_pressure_ratio) {
            return count;
        }

        let factor = self.params.budget_damping_factor.clamp(f64::MIN_POSITIVE, 1.0);
        let damped = ((f64::from(count) * factor).floor() as u32).max(min).max(1);
        warnings.push(format!(
            "Budget Pressure: {:.0}% of budget spent; agent count damped from {} to {}",
            budget.ratio().unwrap_or_default() * 100.0,
            count,
            damped
        ));
        damped
    }
}
