//! Run shell commands inside an already-running container.
//!
//! The flow is linear: confirm the container is running, write the caller's
//! environment to a sourceable file, copy it in, copy in a generated script
//! that sources it, `cd`s to the working directory and runs the commands, then
//! execute the script and report its exit status.
//!
//! ```no_run
//! use container_exec::{execute, ContainerRef, DockerCli, EnvSnapshot, ExecConfig, ExecRequest};
//!
//! let request = ExecRequest {
//!     container: ContainerRef::new("build-env").unwrap(),
//!     workdir: "/app".to_string(),
//!     commands: "make test".to_string(),
//! };
//! let runtime = DockerCli::default();
//! let result = execute(&runtime, &ExecConfig::default(), EnvSnapshot::capture(), &request);
//! ```

mod config;
mod error;
mod executor;
mod liveness;
mod runtime;
mod script;
mod snapshot;

#[cfg(test)]
mod testing;

pub use config::{ExecConfig, DEFAULT_REMOTE_TMP, DEFAULT_RUNTIME};
pub use error::ExecError;
pub use executor::{
    execute, remove_container, remove_local_file, ExecRequest, ExecutionResult, RemoteExecutor,
};
pub use liveness::{is_running, parse_running_state};
pub use runtime::{CommandOutput, ContainerRuntime, DockerCli, RunOptions};
pub use script::{invocation_suffix, CommandScript};
pub use snapshot::EnvSnapshot;

use std::fmt;

/// Name or id of the target container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerRef(String);

impl ContainerRef {
    pub fn new(reference: &str) -> Result<Self, ExecError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ExecError::InvalidInput {
                message: "Container reference cannot be empty".to_string(),
            });
        }
        Ok(Self(reference.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
