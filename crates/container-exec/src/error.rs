use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    #[error("Container is not running.")]
    NotRunning { container: String },
    #[error("Failed to spawn container runtime {runtime}: {source}")]
    RuntimeSpawn {
        runtime: String,
        source: std::io::Error,
    },
    #[error("Failed to copy {local} to {container}:{remote}: {stderr}")]
    Transfer {
        container: String,
        local: PathBuf,
        remote: String,
        exit_status: Option<i32>,
        stderr: String,
    },
    /// The remote script exited non-zero. Displays as the captured stderr.
    #[error("{stderr}")]
    RemoteFailed {
        exit_status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The local runtime client was killed at the deadline. The script inside
    /// the container is not signalled and may still be running.
    #[error("Remote command timed out after {}", humantime::format_duration(.after.clone()))]
    TimedOut { after: Duration, stderr: String },
    #[error("Failed to remove container {container}: {stderr}")]
    Removal {
        container: String,
        exit_status: Option<i32>,
        stderr: String,
    },
    #[error("{message}")]
    Io { message: String },
}

impl ExecError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecError::InvalidInput { .. } => "DOCKER_RUN_INVALID_INPUT",
            ExecError::NotRunning { .. } => "DOCKER_RUN_NOT_RUNNING",
            ExecError::RuntimeSpawn { .. } => "DOCKER_RUN_RUNTIME_ERROR",
            ExecError::Transfer { .. } => "DOCKER_RUN_TRANSFER_FAILED",
            ExecError::RemoteFailed { .. } => "DOCKER_RUN_REMOTE_FAILED",
            ExecError::TimedOut { .. } => "DOCKER_RUN_TIMEOUT",
            ExecError::Removal { .. } => "DOCKER_RUN_REMOVE_FAILED",
            ExecError::Io { .. } => "DOCKER_RUN_IO_ERROR",
        }
    }

    /// Exit status of the remote script, when the failure came from running it.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            ExecError::RemoteFailed { exit_status, .. } => *exit_status,
            _ => None,
        }
    }

    pub(crate) fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        ExecError::Io {
            message: format!("{}: {}", context, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_displays_captured_stderr_only() {
        let err = ExecError::RemoteFailed {
            exit_status: Some(3),
            stdout: "partial".to_string(),
            stderr: "boom\n".to_string(),
        };
        assert_eq!(err.to_string(), "boom\n");
        assert_eq!(err.exit_status(), Some(3));
        assert_eq!(err.code(), "DOCKER_RUN_REMOTE_FAILED");
    }

    #[test]
    fn not_running_uses_fixed_message() {
        let err = ExecError::NotRunning {
            container: "c2".to_string(),
        };
        assert_eq!(err.to_string(), "Container is not running.");
        assert_eq!(err.exit_status(), None);
    }

    #[test]
    fn timeout_formats_duration() {
        let err = ExecError::TimedOut {
            after: Duration::from_secs(90),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Remote command timed out after 1m 30s");
        assert_eq!(err.code(), "DOCKER_RUN_TIMEOUT");
    }
}
