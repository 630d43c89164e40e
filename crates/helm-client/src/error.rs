//! Helm client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelmError {
    /// The helm binary could not be started
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// helm ran and exited unsuccessfully
    #[error("{command} exited with code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Invalid arguments (e.g., empty release name)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
