use crate::config::ExecConfig;
use crate::error::ExecError;
use crate::liveness::is_running;
use crate::runtime::{CommandOutput, ContainerRuntime, RunOptions};
use crate::script::{invocation_suffix, remote_join, CommandScript};
use crate::snapshot::EnvSnapshot;
use crate::ContainerRef;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// One batch of commands to run in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub container: ContainerRef,
    pub workdir: String,
    pub commands: String,
}

/// Outcome of a remote script that exited zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub container: String,
    pub script: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: f64,
}

/// Check liveness, then run the request's commands in the container.
///
/// Nothing is copied into or executed in a container that is not reported
/// as running.
pub fn execute(
    runtime: &dyn ContainerRuntime,
    config: &ExecConfig,
    env: EnvSnapshot,
    request: &ExecRequest,
) -> Result<ExecutionResult, ExecError> {
    config.validate()?;

    if !is_running(runtime, &request.container) {
        return Err(ExecError::NotRunning {
            container: request.container.to_string(),
        });
    }

    RemoteExecutor::new(runtime, config, env).run_remote(
        &request.container,
        &request.workdir,
        &request.commands,
    )
}

/// Copies the environment file and command script into a container and runs
/// the script there.
///
/// Callers are expected to have confirmed liveness; [`execute`] does both.
pub struct RemoteExecutor<'a> {
    runtime: &'a dyn ContainerRuntime,
    config: &'a ExecConfig,
    env: EnvSnapshot,
}

impl<'a> RemoteExecutor<'a> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        config: &'a ExecConfig,
        env: EnvSnapshot,
    ) -> Self {
        Self {
            runtime,
            config,
            env,
        }
    }

    pub fn run_remote(
        &self,
        container: &ContainerRef,
        workdir: &str,
        commands: &str,
    ) -> Result<ExecutionResult, ExecError> {
        let suffix = invocation_suffix();
        let remote_env = remote_join(
            &self.config.remote_tmp,
            &self.config.remote_env_file_name(&suffix),
        );

        let local_env = self.env.write_to(&self.config.local_tmp)?;
        let copied = self.copy_in(container, local_env.path(), &remote_env);
        self.discard(local_env);
        copied?;
        tracing::info!(
            container = %container,
            variables = self.env.len(),
            path = %remote_env,
            "copied environment file"
        );

        let script = CommandScript::new(
            &self.config.remote_tmp,
            &suffix,
            remote_env.as_str(),
            workdir,
            commands,
        );
        let content = script.render();
        let local_script = self.write_local_script(&content)?;
        let copied = self.copy_in(container, local_script.path(), &script.remote_path);
        self.discard(local_script);
        copied?;
        tracing::info!(
            container = %container,
            script = %script.name,
            "Script content:\n{}",
            content
        );

        let args = vec![
            "exec".to_string(),
            "-i".to_string(),
            container.to_string(),
            "bash".to_string(),
            script.remote_path.clone(),
        ];
        let options = RunOptions {
            echo: self.config.echo_output,
            timeout: self.config.timeout,
        };

        let start = Instant::now();
        let output = self.invoke(&args, &options)?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        if output.timed_out {
            return Err(ExecError::TimedOut {
                after: self.config.timeout.unwrap_or_default(),
                stderr: output.stderr,
            });
        }

        tracing::info!(
            container = %container,
            script = %script.name,
            exit_code = ?output.status_code,
            duration_ms,
            "remote script finished"
        );

        if !output.success() {
            return Err(ExecError::RemoteFailed {
                exit_status: output.status_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(ExecutionResult {
            container: container.to_string(),
            script: script.name,
            exit_code: 0,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms,
        })
    }

    fn write_local_script(&self, content: &str) -> Result<NamedTempFile, ExecError> {
        let dir = &self.config.local_tmp;
        let context = || format!("Failed to write script in {}", dir.display());
        let mut file = tempfile::Builder::new()
            .prefix("script-")
            .suffix(".sh")
            .tempfile_in(dir)
            .map_err(|err| ExecError::io(context(), err))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| ExecError::io(context(), err))?;
        Ok(file)
    }

    fn copy_in(
        &self,
        container: &ContainerRef,
        local: &Path,
        remote: &str,
    ) -> Result<(), ExecError> {
        let args = vec![
            "cp".to_string(),
            local.display().to_string(),
            format!("{}:{}", container, remote),
        ];
        let output = self.invoke(&args, &RunOptions::capture())?;
        if output.success() {
            return Ok(());
        }

        Err(ExecError::Transfer {
            container: container.to_string(),
            local: local.to_path_buf(),
            remote: remote.to_string(),
            exit_status: output.status_code,
            stderr: output.stderr.trim().to_string(),
        })
    }

    fn invoke(&self, args: &[String], options: &RunOptions) -> Result<CommandOutput, ExecError> {
        self.runtime
            .run(args, options)
            .map_err(|source| ExecError::RuntimeSpawn {
                runtime: self.runtime.program().to_string(),
                source,
            })
    }

    fn discard(&self, file: NamedTempFile) {
        if let Err(err) = remove_local_file(file) {
            tracing::warn!("{}", err);
        }
    }
}

/// Delete a local temp file. A file that is already gone is not an error.
pub fn remove_local_file(file: NamedTempFile) -> Result<(), ExecError> {
    let path = file.path().to_path_buf();
    match file.close() {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ExecError::io(
            format!("Error deleting file {}", path.display()),
            err,
        )),
    }
}

/// Force-remove a container (`rm --force`).
pub fn remove_container(
    runtime: &dyn ContainerRuntime,
    container: &ContainerRef,
) -> Result<(), ExecError> {
    let args = vec![
        "rm".to_string(),
        "--force".to_string(),
        container.to_string(),
    ];
    let output = runtime
        .run(&args, &RunOptions::capture())
        .map_err(|source| ExecError::RuntimeSpawn {
            runtime: runtime.program().to_string(),
            source,
        })?;

    if !output.success() {
        return Err(ExecError::Removal {
            container: container.to_string(),
            exit_status: output.status_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    tracing::info!(container = %container, "removed container");
    Ok(())
}
