use std::{ffi::OsString, path::PathBuf, process::Stdio};

use tokio::process::{Child, Command};
use tracing::trace;

use crate::PoolError;

/// Environment variable carrying a worker's slot index.
pub const WORKER_SLOT_ENV: &str = "WIREBENCH_WORKER_SLOT";

/// How to launch one worker process.
#[derive(Debug, Clone, Default)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Re-execute the running binary.
    pub fn current_exe() -> Result<Self, PoolError> {
        std::env::current_exe()
            .map(Self::new)
            .map_err(PoolError::Executable)
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Spawn the worker for `slot`.
    ///
    /// The child gets its own process group so a terminal Ctrl-C reaches only the
    /// supervisor, which then stops workers itself. On Linux the child also gets
    /// SIGTERM when the spawning thread dies, so a killed supervisor leaves no
    /// workers behind on the shared port.
    pub(crate) fn spawn(&self, slot: usize) -> Result<Child, PoolError> {
        trace!(slot, program = %self.program.display(), args = ?self.args, "spawn");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env(WORKER_SLOT_ENV, slot.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        cmd.process_group(0);
        #[cfg(target_os = "linux")]
        die_with_parent(&mut cmd);

        cmd.spawn().map_err(|source| PoolError::Spawn { slot, source })
    }
}

#[cfg(target_os = "linux")]
fn die_with_parent(cmd: &mut Command) {
    use nix::{
        errno::Errno,
        sys::{prctl, signal::Signal},
        unistd::getppid,
    };

    let parent = std::process::id();
    // SAFETY: prctl(2) and getppid(2) are async-signal-safe; nothing allocates.
    unsafe {
        cmd.pre_exec(move || {
            prctl::set_pdeathsig(Signal::SIGTERM)?;
            // The parent may have died between fork and prctl.
            if getppid().as_raw() as u32 != parent {
                return Err(Errno::ESRCH.into());
            }
            Ok(())
        });
    }
}
