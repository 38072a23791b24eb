//! Common error types for duodeck

use thiserror::Error;

/// Common result type for duodeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across both duodeck services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External command exited non-zero
    ///
    /// `stderr` carries the captured diagnostic text of the failed command.
    #[error("Command `{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// Output of an external command could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Control-plane HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short diagnostic for log lines (stderr text for command failures)
    pub fn diagnostic(&self) -> String {
        match self {
            Error::Command { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            Error::Command { .. } => "unknown error".to_string(),
            other => other.to_string(),
        }
    }
}
