use crate::error::ExecError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RUNTIME: &str = "docker";
pub const DEFAULT_REMOTE_TMP: &str = "/tmp";
const SHARED_ENV_FILE: &str = "env.sh";

/// Settings for one remote execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    /// Container runtime binary, e.g. `docker` or `podman`.
    pub runtime: String,
    /// Directory inside the container that receives the env file and script.
    pub remote_tmp: String,
    /// Host directory for the transient local copies.
    pub local_tmp: PathBuf,
    pub timeout: Option<Duration>,
    /// Name the remote env file per invocation instead of the shared
    /// `env.sh`, so concurrent runs against one container cannot clobber it.
    pub isolate_env: bool,
    pub echo_output: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            remote_tmp: DEFAULT_REMOTE_TMP.to_string(),
            local_tmp: env::temp_dir(),
            timeout: None,
            isolate_env: false,
            echo_output: true,
        }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.runtime.trim().is_empty() {
            return Err(ExecError::InvalidInput {
                message: "Container runtime cannot be empty".to_string(),
            });
        }

        if !self.remote_tmp.starts_with('/') {
            return Err(ExecError::InvalidInput {
                message: format!(
                    "Remote temp directory '{}' must be absolute",
                    self.remote_tmp
                ),
            });
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(ExecError::InvalidInput {
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub(crate) fn remote_env_file_name(&self, suffix: &str) -> String {
        if self.isolate_env {
            format!("env-{}.sh", suffix)
        } else {
            SHARED_ENV_FILE.to_string()
        }
    }
}
