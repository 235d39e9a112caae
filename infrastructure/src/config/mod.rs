//! Configuration file loading for agent-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_COUNCIL_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;
mod matrix;

pub use file_config::{
    FileBackendConfig, FileConfig, FileConsensusConfig, FileCostConfig, FileEngineConfig,
    FileEvaluatorsConfig, FileOutputConfig, FileTriageConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader};
pub use matrix::{DEFAULT_DECISION_MATRIX, load_decision_matrix};
