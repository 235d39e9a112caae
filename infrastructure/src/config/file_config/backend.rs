//! Backend configuration from TOML (`[backend]` section)

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw backend configuration
///
/// The command receives the prompt on stdin and answers on stdout.
///
/// # Example
///
/// ```toml
/// [backend]
/// command = "llm"
/// args = ["-m", "gpt-4o-mini"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Separate command for agent, gate and synthesis nodes; defaults to `command`
    pub executor_command: Option<String>,
    pub executor_args: Option<Vec<String>>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            command: "llm".to_string(),
            args: Vec::new(),
            executor_command: None,
            executor_args: None,
        }
    }
}

impl FileBackendConfig {
    /// Command and args for workflow nodes
    pub fn executor(&self) -> (String, Vec<String>) {
        match &self.executor_command {
            Some(command) => (
                command.clone(),
                self.executor_args.clone().unwrap_or_default(),
            ),
            None => (
                self.command.clone(),
                self.executor_args.clone().unwrap_or_else(|| self.args.clone()),
            ),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyList {
                    field: "backend.command".to_string(),
                },
                "backend.command cannot be empty",
            ));
        }
        if self
            .executor_command
            .as_ref()
            .is_some_and(|c| c.trim().is_empty())
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyList {
                    field: "backend.executor_command".to_string(),
                },
                "backend.executor_command cannot be empty when set",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_defaults_to_backend_command() {
        let config = FileBackendConfig {
            command: "llm".into(),
            args: vec!["-m".into(), "x".into()],
            ..Default::default()
        };
        assert_eq!(config.executor(), ("llm".to_string(), vec!["-m".to_string(), "x".to_string()]));
    }

    #[test]
    fn test_separate_executor_command() {
        let config = FileBackendConfig {
            executor_command: Some("agent-runner".into()),
            ..Default::default()
        };
        assert_eq!(config.executor(), ("agent-runner".to_string(), vec![]));
    }

    #[test]
    fn test_empty_command_is_error() {
        let config = FileBackendConfig {
            command: " ".into(),
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 1);
    }
}
