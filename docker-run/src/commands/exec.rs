//! `docker-run exec` - run commands inside a running container

use crate::actions;
use anyhow::{Context, Result};
use clap::Args;
use container_exec::{
    execute, ContainerRef, DockerCli, EnvSnapshot, ExecConfig, ExecError, ExecRequest,
    DEFAULT_REMOTE_TMP, DEFAULT_RUNTIME,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Name or id of the running container
    #[arg(long, env = "INPUT_CONTAINER_NAME")]
    pub container: String,

    /// Working directory inside the container
    #[arg(long, env = "INPUT_WORKDIR")]
    pub workdir: String,

    /// Commands to run (may span several lines)
    #[arg(long, env = "INPUT_RUN")]
    pub run: String,

    /// Container runtime binary
    #[arg(long, env = "DOCKER_RUN_RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Directory inside the container for the env file and script
    #[arg(long, env = "DOCKER_RUN_REMOTE_TMP", default_value = DEFAULT_REMOTE_TMP)]
    pub remote_tmp: String,

    /// Host directory for transient files (default: system temp dir)
    #[arg(long, env = "DOCKER_RUN_LOCAL_TMP")]
    pub local_tmp: Option<PathBuf>,

    /// Kill the remote command after this long, e.g. "90s" or "10m"
    #[arg(long, env = "DOCKER_RUN_TIMEOUT", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Give the env file a per-run name instead of the shared env.sh
    #[arg(long, env = "DOCKER_RUN_ISOLATE_ENV")]
    pub isolate_env: bool,

    /// Do not relay the command's output while it runs
    #[arg(long)]
    pub quiet: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

impl ExecArgs {
    fn config(&self) -> ExecConfig {
        let mut config = ExecConfig {
            runtime: self.runtime.clone(),
            remote_tmp: self.remote_tmp.clone(),
            timeout: self.timeout,
            isolate_env: self.isolate_env,
            echo_output: !self.quiet && !self.json,
            ..Default::default()
        };
        if let Some(dir) = &self.local_tmp {
            config.local_tmp = dir.clone();
        }
        config
    }
}

pub fn run(args: ExecArgs) -> Result<()> {
    let config = args.config();
    config.validate().context("Invalid configuration")?;

    let request = ExecRequest {
        container: ContainerRef::new(&args.container).context("Invalid container_name input")?,
        workdir: args.workdir.clone(),
        commands: args.run.clone(),
    };
    let runtime = DockerCli::new(config.runtime.as_str());

    match execute(&runtime, &config, EnvSnapshot::capture(), &request) {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!("status=success");
            }
            actions::set_output("status", "success")?;
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                code = err.code(),
                exit_code = ?err.exit_status(),
                container = %request.container,
                "remote execution failed"
            );
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "error": err.to_string(),
                        "code": err.code(),
                        "exitCode": err.exit_status(),
                    })
                );
            }
            actions::error(&failure_message(&err));
            std::process::exit(1);
        }
    }
}

fn failure_message(err: &ExecError) -> String {
    match err {
        ExecError::NotRunning { .. } => err.to_string(),
        _ => format!("Action failed with error {}", err),
    }
}
