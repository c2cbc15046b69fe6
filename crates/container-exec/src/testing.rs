use crate::runtime::{CommandOutput, ContainerRuntime, RunOptions};
use std::cell::RefCell;
use std::fs;
use std::io;

/// Records every runtime call and replays queued outputs in order. Calls
/// beyond the queue succeed with empty output.
#[derive(Default)]
pub(crate) struct FakeRuntime {
    calls: RefCell<Vec<Vec<String>>>,
    options: RefCell<Vec<RunOptions>>,
    outputs: RefCell<Vec<CommandOutput>>,
    copied: RefCell<Vec<(String, String)>>,
    #[cfg(unix)]
    copied_modes: RefCell<Vec<u32>>,
    fail_spawn_at: RefCell<Option<usize>>,
    block_local_cleanup: RefCell<bool>,
}

impl FakeRuntime {
    pub(crate) fn push_output(&self, output: CommandOutput) {
        self.outputs.borrow_mut().push(output);
    }

    pub(crate) fn fail_next_spawn(&self) {
        self.fail_spawn_at(self.calls.borrow().len());
    }

    pub(crate) fn fail_spawn_at(&self, index: usize) {
        *self.fail_spawn_at.borrow_mut() = Some(index);
    }

    /// Swap each copied local file for a directory of the same name so the
    /// executor's later delete of it fails.
    pub(crate) fn block_local_cleanup(&self) {
        *self.block_local_cleanup.borrow_mut() = true;
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub(crate) fn options(&self) -> Vec<RunOptions> {
        self.options.borrow().clone()
    }

    /// `(destination, file contents)` for every `cp` call, read at call time
    /// since the executor deletes the local file right after.
    pub(crate) fn copied(&self) -> Vec<(String, String)> {
        self.copied.borrow().clone()
    }

    /// Permission bits of each copied local file at `cp` time.
    #[cfg(unix)]
    pub(crate) fn copied_modes(&self) -> Vec<u32> {
        self.copied_modes.borrow().clone()
    }
}

impl ContainerRuntime for FakeRuntime {
    fn program(&self) -> &str {
        "fake-docker"
    }

    fn run(&self, args: &[String], options: &RunOptions) -> io::Result<CommandOutput> {
        let index = self.calls.borrow().len();
        self.calls.borrow_mut().push(args.to_vec());
        self.options.borrow_mut().push(*options);

        if *self.fail_spawn_at.borrow() == Some(index) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "fake-docker not found"));
        }

        if args.first().map(String::as_str) == Some("cp") && args.len() == 3 {
            let contents = fs::read_to_string(&args[1]).unwrap_or_default();
            self.copied.borrow_mut().push((args[2].clone(), contents));

            #[cfg(unix)]
            if let Ok(meta) = fs::metadata(&args[1]) {
                use std::os::unix::fs::PermissionsExt;
                self.copied_modes
                    .borrow_mut()
                    .push(meta.permissions().mode());
            }

            if *self.block_local_cleanup.borrow() {
                let _ = fs::remove_file(&args[1]);
                let _ = fs::create_dir(&args[1]);
            }
        }

        let mut queued = self.outputs.borrow_mut();
        if queued.is_empty() {
            return Ok(CommandOutput {
                status_code: Some(0),
                ..Default::default()
            });
        }
        Ok(queued.remove(0))
    }
}
