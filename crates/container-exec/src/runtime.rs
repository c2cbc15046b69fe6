use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Captured result of a single runtime invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status_code == Some(0)
    }
}

/// How a runtime invocation should treat its output streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Relay the child's stdout/stderr to ours while capturing.
    pub echo: bool,
    /// Kill the child if it has not exited within this window.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn capture() -> Self {
        Self::default()
    }
}

/// A container runtime CLI (`docker`, `podman`, ...).
///
/// Every inspect, copy, exec and rm call goes through `run`, which makes the
/// runtime the single seam tests replace.
pub trait ContainerRuntime {
    fn program(&self) -> &str;

    fn run(&self, args: &[String], options: &RunOptions) -> io::Result<CommandOutput>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerRuntime for DockerCli {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[String], options: &RunOptions) -> io::Result<CommandOutput> {
        tracing::debug!(runtime = %self.program, args = %args.join(" "), "invoking runtime");

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .map(|pipe| drain(pipe, options.echo.then(|| Box::new(io::stdout()) as Sink)));
        let stderr = child
            .stderr
            .take()
            .map(|pipe| drain(pipe, options.echo.then(|| Box::new(io::stderr()) as Sink)));

        let (status, timed_out) = wait(&mut child, options.timeout)?;

        Ok(CommandOutput {
            status_code: status.and_then(|s| s.code()),
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
            timed_out,
        })
    }
}

type Sink = Box<dyn Write + Send>;

fn drain<R>(mut reader: R, mut echo: Option<Sink>) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut captured = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    captured.extend_from_slice(&chunk[..n]);
                    if let Some(sink) = echo.as_mut() {
                        // A closed terminal must not abort the capture.
                        let _ = sink.write_all(&chunk[..n]);
                        let _ = sink.flush();
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        captured
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> io::Result<(Option<ExitStatus>, bool)> {
    let Some(limit) = timeout else {
        return Ok((Some(child.wait()?), false));
    };

    match child.wait_timeout(limit)? {
        Some(status) => Ok((Some(status), false)),
        None => {
            tracing::warn!(timeout = %humantime::format_duration(limit), "killing runtime process");
            child.kill()?;
            child.wait()?;
            Ok((None, true))
        }
    }
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> io::Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "output reader thread panicked"))?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}
