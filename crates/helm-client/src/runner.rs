//! Command execution for the helm CLI
//!
//! The runner is a trait so unit tests can replace process execution with
//! canned output.

use crate::error::HelmError;
use tracing::debug;

/// Output from a command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external program and captures its output
#[async_trait::async_trait]
pub trait CmdRunner: Send + Sync {
    /// Run `program` with `args`, returning output regardless of exit code
    ///
    /// Only failure to start the process is an error.
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, HelmError>;
}

/// Runner spawning real processes with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRunner;

#[async_trait::async_trait]
impl CmdRunner for DefaultRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, HelmError> {
        let command = format!("{} {}", program, args.join(" "));
        debug!("Executing: {}", command);

        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| HelmError::Spawn {
                command: command.clone(),
                source,
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!("Command exited with code {}: {}", exit_code, command);

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code,
        })
    }
}
