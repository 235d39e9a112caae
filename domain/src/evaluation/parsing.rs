//! Evaluation parsing from reasoning-backend output.
//!
//! Pure domain logic: the backend hands over text, this module decides
//! whether it is a well-formed [`Evaluation`].

use super::entities::Evaluation;
use crate::core::json::extract_json_object;
use thiserror::Error;

/// Why a backend answer could not be read as an evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationParseError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("malformed evaluation: {0}")]
    Malformed(String),

    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Parse an evaluation from a model response.
///
/// Accepts a fenced ` ```json ` block or a bare JSON object. Enum fields must
/// use the wire names (`"very_complex"`, `"hybrid"`, ...). A confidence outside
/// `[0, 1]` is treated as malformed output rather than clamped.
pub fn parse_evaluation(response: &str) -> Result<Evaluation, EvaluationParseError> {
    let json = extract_json_object(response).ok_or(EvaluationParseError::NoJson)?;
    let evaluation: Evaluation = serde_json::from_str(json)
        .map_err(|e| EvaluationParseError::Malformed(e.to_string()))?;

    if !(0.0..=1.0).contains(&evaluation.confidence) {
        return Err(EvaluationParseError::ConfidenceOutOfRange(
            evaluation.confidence,
        ));
    }

    Ok(evaluation)
}
