//! Triage configuration from TOML (`[triage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw triage configuration
///
/// Without `decision_matrix` the built-in matrix is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTriageConfig {
    pub decision_matrix: Option<PathBuf>,
}
