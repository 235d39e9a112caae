//! Orchestration plan entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered project phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    Discovery,
    Design,
    Implementation,
    Validation,
    Refinement,
}

impl ProjectPhase {
    pub const ALL: [ProjectPhase; 5] = [
        ProjectPhase::Discovery,
        ProjectPhase::Design,
        ProjectPhase::Implementation,
        ProjectPhase::Validation,
        ProjectPhase::Refinement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPhase::Discovery => "discovery",
            ProjectPhase::Design => "design",
            ProjectPhase::Implementation => "implementation",
            ProjectPhase::Validation => "validation",
            ProjectPhase::Refinement => "refinement",
        }
    }

    /// Phase a role works in; unknown roles implement
    pub fn for_role(role: &str) -> Self {
        match role {
            "researcher" | "analyst" => ProjectPhase::Discovery,
            "architect" | "strategist" | "innovator" => ProjectPhase::Design,
            "tester" | "critic" | "reviewer" | "auditor" => ProjectPhase::Validation,
            "commentator" => ProjectPhase::Refinement,
            _ => ProjectPhase::Implementation,
        }
    }
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| DomainError::InvalidValue {
                field: "project_phase",
                value: s.to_string(),
            })
    }
}

/// How the requests of one plan are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    Concurrent,
    Sequential,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Concurrent => "concurrent",
            ExecutionStrategy::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single agent to dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub instruction: String,
    pub context: String,
    pub role: String,
    pub domains: Vec<String>,
    pub analysis_type: String,
}

impl AgentRequest {
    /// Short label used in logs and prompts, e.g. `tester[api, security]`
    pub fn label(&self) -> String {
        if self.domains.is_empty() {
            self.role.clone()
        } else {
            format!("{}[{}]", self.role, self.domains.join(", "))
        }
    }
}

/// A batch of agent requests sharing one background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationPlan {
    pub common_background: String,
    pub agent_requests: Vec<AgentRequest>,
    pub execution_strategy: ExecutionStrategy,
    /// `None` for a collapsed (all-phase) or refinement plan
    pub phase: Option<ProjectPhase>,
}

impl OrchestrationPlan {
    pub fn len(&self) -> usize {
        self.agent_requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agent_requests.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.agent_requests.iter().map(|r| r.role.as_str())
    }
}
