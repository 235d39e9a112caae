//! Evaluation value objects - the closed vocabularies evaluators vote over.
//!
//! - [`Complexity`] - how hard the task is
//! - [`WorkflowPattern`] - how agents should be arranged in time
//! - [`QualityLevel`] - how much verification the result needs
//!
//! Each enum serializes to its lowercase snake_case wire name. The wire name
//! is also the key used for alphabetical tie-breaking in consensus votes.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Task complexity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    VeryComplex,
}

impl Complexity {
    pub const ALL: [Complexity; 4] = [
        Complexity::Simple,
        Complexity::Medium,
        Complexity::Complex,
        Complexity::VeryComplex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
            Complexity::VeryComplex => "very_complex",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match wire_key(s).as_str() {
            "simple" => Ok(Complexity::Simple),
            "medium" | "moderate" => Ok(Complexity::Medium),
            "complex" => Ok(Complexity::Complex),
            "very_complex" => Ok(Complexity::VeryComplex),
            _ => Err(DomainError::InvalidValue {
                field: "complexity",
                value: s.to_string(),
            }),
        }
    }
}

/// Arrangement of agents over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPattern {
    /// All agents at once
    Parallel,
    /// Phase after phase, one agent after another
    Sequential,
    /// Phases in order, agents within a phase at once
    Hybrid,
}

impl WorkflowPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPattern::Parallel => "parallel",
            WorkflowPattern::Sequential => "sequential",
            WorkflowPattern::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for WorkflowPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkflowPattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match wire_key(s).as_str() {
            "parallel" => Ok(WorkflowPattern::Parallel),
            "sequential" => Ok(WorkflowPattern::Sequential),
            "hybrid" => Ok(WorkflowPattern::Hybrid),
            _ => Err(DomainError::InvalidValue {
                field: "workflow_pattern",
                value: s.to_string(),
            }),
        }
    }
}

/// Required verification depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Basic,
    Thorough,
    Critical,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Basic => "basic",
            QualityLevel::Thorough => "thorough",
            QualityLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QualityLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match wire_key(s).as_str() {
            "basic" => Ok(QualityLevel::Basic),
            "thorough" => Ok(QualityLevel::Thorough),
            "critical" => Ok(QualityLevel::Critical),
            _ => Err(DomainError::InvalidValue {
                field: "quality_level",
                value: s.to_string(),
            }),
        }
    }
}

/// Lowercase, with `-` and spaces folded to `_`
fn wire_key(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_parse() {
        assert_eq!("simple".parse::<Complexity>().ok(), Some(Complexity::Simple));
        assert_eq!(
            "Very-Complex".parse::<Complexity>().ok(),
            Some(Complexity::VeryComplex)
        );
        assert_eq!(
            "very complex".parse::<Complexity>().ok(),
            Some(Complexity::VeryComplex)
        );
        assert!("trivial".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_complexity_ordering() {
        assert!(Complexity::Simple < Complexity::Medium);
        assert!(Complexity::Complex < Complexity::VeryComplex);
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&Complexity::VeryComplex).unwrap();
        assert_eq!(json, "\"very_complex\"");

        let pattern: WorkflowPattern = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(pattern, WorkflowPattern::Hybrid);

        let quality: QualityLevel = serde_json::from_str("\"thorough\"").unwrap();
        assert_eq!(quality, QualityLevel::Thorough);
    }

    #[test]
    fn test_display_matches_wire_name() {
        for c in Complexity::ALL {
            assert_eq!(c.to_string().parse::<Complexity>().ok(), Some(c));
        }
        assert_eq!(QualityLevel::Critical.to_string(), "critical");
        assert_eq!(WorkflowPattern::Sequential.to_string(), "sequential");
    }

    #[test]
    fn test_invalid_value_error() {
        let err = "sometimes".parse::<WorkflowPattern>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for workflow_pattern: 'sometimes'"
        );
    }
}
