//! Prompt-in, text-out subprocess invocation

use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl CommandError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound(_))
    }
}

/// Runs one external command per call, writing the prompt to its stdin and
/// returning its stdout.
///
/// The child is killed if the returned future is dropped (for example by a
/// timeout or cancellation upstream).
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the program resolves to an executable
    pub fn is_available(&self) -> bool {
        let path = Path::new(&self.program);
        if path.components().count() > 1 {
            return path.is_file();
        }
        which::which(&self.program).is_ok()
    }

    pub async fn run(&self, input: &str, env: &[(&str, &str)]) -> Result<String, CommandError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(env.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        debug!(program = %self.program, bytes = input.len(), "Spawned command");

        let stdin = child.stdin.take();
        let payload = input.as_bytes().to_vec();
        let write = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading stdin is not an error here;
                // its exit status decides.
                let _ = stdin.write_all(&payload).await;
                let _ = stdin.shutdown().await;
            }
        };
        let ((), output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|source| CommandError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CommandError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, error: std::io::Error) -> CommandError {
        if error.kind() == std::io::ErrorKind::NotFound {
            CommandError::NotFound(self.program.clone())
        } else {
            CommandError::Io {
                program: self.program.clone(),
                source: error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandRunner {
        CommandRunner::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_prompt_goes_to_stdin() {
        let output = sh("tr a-z A-Z").run("hello", &[]).await.unwrap();
        assert_eq!(output, "HELLO");
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let output = sh("printf %s \"$COUNCIL_TEST\"")
            .run("", &[("COUNCIL_TEST", "value")])
            .await
            .unwrap();
        assert_eq!(output, "value");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let result = sh("echo boom >&2; exit 3").run("", &[]).await;
        match result {
            Err(CommandError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let runner = CommandRunner::new("agent-council-no-such-binary", vec![]);
        assert!(!runner.is_available());
        let result = runner.run("x", &[]).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_sh_is_available() {
        assert!(sh("true").is_available());
    }
}
