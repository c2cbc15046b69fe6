//! `docker-run cleanup` - post-job removal of a recorded container

use crate::actions;
use anyhow::Result;
use clap::Args;
use container_exec::{remove_container, ContainerRef, DockerCli, DEFAULT_RUNTIME};

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Container to remove (default: the name saved by the start step)
    #[arg(long, env = "STATE_container_name")]
    pub container: Option<String>,

    /// Container runtime binary
    #[arg(long, env = "DOCKER_RUN_RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,
}

/// Removal failures are reported but never fail the job.
pub fn run(args: CleanupArgs) -> Result<()> {
    let Some(container) = args
        .container
        .as_deref()
        .and_then(|name| ContainerRef::new(name).ok())
    else {
        tracing::info!("no container recorded; nothing to clean up");
        return Ok(());
    };

    let runtime = DockerCli::new(args.runtime.as_str());
    if let Err(err) = remove_container(&runtime, &container) {
        tracing::error!(code = err.code(), container = %container, "cleanup failed");
        actions::error(&format!("Cleanup failed with error {}", err));
    }
    Ok(())
}
