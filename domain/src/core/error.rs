//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No evaluations to build a consensus from")]
    NoEvaluations,

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

/// Fatal startup-time configuration problems (e.g. a bad decision matrix).
///
/// These are never retried: the process should refuse to start.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Decision matrix not found: {0}")]
    MatrixNotFound(String),

    #[error("Malformed decision matrix: {0}")]
    MalformedMatrix(String),

    #[error("Decision matrix lists tier '{0}' more than once")]
    DuplicateTier(String),

    #[error("Decision matrix tier '{0}' has no indicators")]
    EmptyTier(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
