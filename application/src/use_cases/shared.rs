//! Shared utilities for use cases.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Marker error for a caller-initiated cancellation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// Check if cancellation has been requested.
///
/// Returns `Err(Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), Cancelled> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(Cancelled);
    }
    Ok(())
}
