//! Decision matrix loading

use council_domain::{ConfigurationError, DecisionMatrix};
use std::path::Path;

/// Matrix used when `[triage] decision_matrix` is not set
pub const DEFAULT_DECISION_MATRIX: &str = include_str!("defaults/decision_matrix.toml");

/// Load and validate the decision matrix.
///
/// A configured path that is missing or unparsable is fatal; it never falls
/// back to the built-in matrix.
pub fn load_decision_matrix(path: Option<&Path>) -> Result<DecisionMatrix, ConfigurationError> {
    let (source, text) = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                ConfigurationError::MatrixNotFound(format!("{}: {}", path.display(), e))
            })?;
            (path.display().to_string(), text)
        }
        None => ("built-in".to_string(), DEFAULT_DECISION_MATRIX.to_string()),
    };

    let matrix: DecisionMatrix = toml::from_str(&text)
        .map_err(|e| ConfigurationError::MalformedMatrix(format!("{source}: {e}")))?;
    let matrix = matrix.validated()?;

    tracing::debug!(source = %source, tiers = matrix.tiers.len(), "Loaded decision matrix");
    Ok(matrix)
}
