use crate::runtime::{ContainerRuntime, RunOptions};
use crate::ContainerRef;

const RUNNING_STATE_FORMAT: &str = "{{.State.Running}}";

/// Interpret the runtime's `.State.Running` output.
///
/// Shell quoting of the format string can leak through, so a single-quoted
/// `'true'` counts as running too.
pub fn parse_running_state(output: &str) -> bool {
    matches!(output.trim(), "true" | "'true'")
}

/// Ask the runtime whether `container` is running.
///
/// Never fails: an inspection that cannot be spawned or exits non-zero is
/// logged and reported as not running, so a missing container and a stopped
/// one look the same to the caller.
pub fn is_running(runtime: &dyn ContainerRuntime, container: &ContainerRef) -> bool {
    let args = vec![
        "inspect".to_string(),
        "-f".to_string(),
        RUNNING_STATE_FORMAT.to_string(),
        container.to_string(),
    ];

    let output = match runtime.run(&args, &RunOptions::capture()) {
        Ok(output) => output,
        Err(err) => {
            tracing::error!(
                container = %container,
                runtime = runtime.program(),
                "Failed to inspect container {}: {}",
                container,
                err
            );
            return false;
        }
    };

    if !output.success() {
        tracing::error!(
            container = %container,
            exit_code = ?output.status_code,
            "Failed to inspect container {}: {}",
            container,
            output.stderr.trim()
        );
        return false;
    }

    let running = parse_running_state(&output.stdout);
    tracing::info!(container = %container, running, "inspected container state");
    running
}
