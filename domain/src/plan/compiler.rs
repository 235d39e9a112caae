//! Plan compiler
//!
//! Turns a [`Consensus`] into the plans the execution engine runs: either a
//! single collapsed plan or one plan per project phase, plus refinement
//! plans driven by gate failures.

use super::entities::{AgentRequest, ExecutionStrategy, OrchestrationPlan, ProjectPhase};
use crate::consensus::Consensus;
use crate::evaluation::WorkflowPattern;
use crate::gate::GateResult;
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanCompilationError {
    #[error("consensus recommends no roles")]
    NoEligibleRoles,

    #[error("{plan} plan needs {requested} agents but at most {max} may run at once")]
    ExceedsMaxAgents {
        plan: String,
        requested: usize,
        max: usize,
    },
}

/// Role that fixes problems in a gate component
pub fn component_role(component: &str) -> &'static str {
    match component {
        "security" => "auditor",
        "correctness" | "tests" | "testing" => "tester",
        "performance" => "analyst",
        "architecture" | "design" => "architect",
        "documentation" => "commentator",
        _ => "reviewer",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanParams {
    /// Upper bound on requests in a single plan
    pub max_agents: usize,
    pub domains_per_agent: usize,
}

impl Default for PlanParams {
    fn default() -> Self {
        Self {
            max_agents: 20,
            domains_per_agent: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanCompiler {
    params: PlanParams,
}

impl PlanCompiler {
    pub fn new(params: PlanParams) -> Self {
        Self { params }
    }

    /// Compile the initial plans, in execution order.
    ///
    /// `parallel` collapses every phase into one concurrent plan. Otherwise
    /// one plan per non-empty phase is produced; phases before
    /// `project_phase` fold into it.
    pub fn compile(
        &self,
        task: &str,
        consensus: &Consensus,
        project_phase: Option<ProjectPhase>,
    ) -> Result<Vec<OrchestrationPlan>, PlanCompilationError> {
        let roles: Vec<&str> = consensus.roles().collect();
        if roles.is_empty() {
            return Err(PlanCompilationError::NoEligibleRoles);
        }

        let background = PromptTemplate::common_background(task, consensus);
        let count = consensus.agent_count.max(1) as usize;

        let requests: Vec<AgentRequest> = (0..count)
            .map(|slot| {
                let role = roles[slot % roles.len()];
                let reuse = slot / roles.len();
                let domains = self.domain_window(&consensus.domains, reuse);
                self.request(task, &background, role, domains)
            })
            .collect();

        let plans = match consensus.workflow_pattern {
            WorkflowPattern::Parallel => vec![OrchestrationPlan {
                common_background: background,
                agent_requests: requests,
                execution_strategy: ExecutionStrategy::Concurrent,
                phase: None,
            }],
            pattern => {
                let strategy = match pattern {
                    WorkflowPattern::Sequential => ExecutionStrategy::Sequential,
                    _ => ExecutionStrategy::Concurrent,
                };
                ProjectPhase::ALL
                    .into_iter()
                    .filter(|phase| project_phase.is_none_or(|start| *phase >= start))
                    .filter_map(|phase| {
                        let in_phase: Vec<AgentRequest> = requests
                            .iter()
                            .filter(|r| fold_phase(&r.role, project_phase) == phase)
                            .cloned()
                            .collect();
                        (!in_phase.is_empty()).then(|| OrchestrationPlan {
                            common_background: background.clone(),
                            agent_requests: in_phase,
                            execution_strategy: strategy,
                            phase: Some(phase),
                        })
                    })
                    .collect()
            }
        };

        for plan in &plans {
            self.check_size(plan)?;
        }
        Ok(plans)
    }

    /// Compile a refinement plan from the latest gate result.
    ///
    /// Holds each role implicated by a failing component once, in gate
    /// order, capped at `clamp(rounds_needed, 1, max_agents)`. Falls back to
    /// the top consensus roles when no component is failing.
    pub fn compile_refinement(
        &self,
        task: &str,
        consensus: &Consensus,
        gate: &GateResult,
    ) -> Result<OrchestrationPlan, PlanCompilationError> {
        let cap = (consensus.rounds_needed as usize).clamp(1, self.params.max_agents.max(1));

        // (role, problems) in first-implicated order
        let mut implicated: Vec<(&str, Vec<String>)> = Vec::new();
        for component in gate.failing_components() {
            let role = component_role(&component.name);
            let problems = component
                .problems
                .iter()
                .map(|p| format!("{}: {}", component.name, p));
            match implicated.iter_mut().find(|(r, _)| *r == role) {
                Some((_, existing)) => existing.extend(problems),
                None => implicated.push((role, problems.collect())),
            }
        }

        if implicated.is_empty() {
            implicated = consensus.roles().map(|r| (r, Vec::new())).collect();
        }
        if implicated.is_empty() {
            return Err(PlanCompilationError::NoEligibleRoles);
        }

        let background = PromptTemplate::common_background(task, consensus);
        let agent_requests = implicated
            .into_iter()
            .take(cap)
            .map(|(role, problems)| AgentRequest {
                instruction: PromptTemplate::refinement_instruction(
                    role,
                    task,
                    &problems,
                    &gate.feedback,
                ),
                context: background.clone(),
                role: role.to_string(),
                domains: self.domain_window(&consensus.domains, 0),
                analysis_type: ProjectPhase::Refinement.as_str().to_string(),
            })
            .collect();

        Ok(OrchestrationPlan {
            common_background: background,
            agent_requests,
            execution_strategy: ExecutionStrategy::Concurrent,
            phase: None,
        })
    }

    fn request(&self, task: &str, background: &str, role: &str, domains: Vec<String>) -> AgentRequest {
        let context = if domains.is_empty() {
            background.to_string()
        } else {
            format!("{background}\nYour domains: {}.", domains.join(", "))
        };
        AgentRequest {
            instruction: PromptTemplate::agent_instruction(role, &domains, task),
            context,
            role: role.to_string(),
            domains,
            analysis_type: ProjectPhase::for_role(role).as_str().to_string(),
        }
    }

    /// Up to `domains_per_agent` domains starting at `shift`, wrapping
    fn domain_window(&self, domains: &[String], shift: usize) -> Vec<String> {
        if domains.is_empty() {
            return Vec::new();
        }
        let width = self.params.domains_per_agent.min(domains.len());
        (0..width)
            .map(|i| domains[(shift + i) % domains.len()].clone())
            .collect()
    }

    fn check_size(&self, plan: &OrchestrationPlan) -> Result<(), PlanCompilationError> {
        if plan.len() > self.params.max_agents {
            return Err(PlanCompilationError::ExceedsMaxAgents {
                plan: plan
                    .phase
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| "collapsed".to_string()),
                requested: plan.len(),
                max: self.params.max_agents,
            });
        }
        Ok(())
    }
}

fn fold_phase(role: &str, project_phase: Option<ProjectPhase>) -> ProjectPhase {
    let phase = ProjectPhase::for_role(role);
    match project_phase {
        Some(start) if phase < start => start,
        _ => phase,
    }
}
