//! Operating-system process runner.
//!
//! Unix targets replace the process image with `execvp(3)` semantics via
//! [`std::os::unix::process::CommandExt::exec`] and terminate children with
//! `SIGTERM`. Background children get their own process group so a Ctrl-C
//! typed into the debugger does not reach the emulator. Elsewhere the handoff
//! is spawn, wait, and exit with the child's code.

use std::convert::Infallible;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::debug;

use super::{BackgroundProcess, LogFiles, ProcessRunner};
use crate::command::CommandSpec;
use crate::common::{LaunchError, Result};

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a runner.
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn resolve(&self, program: &OsStr) -> Result<PathBuf> {
        which::which(program).map_err(|source| LaunchError::BinaryNotFound {
            program: program.to_string_lossy().into_owned(),
            source,
        })
    }

    fn exec(&mut self, spec: &CommandSpec) -> io::Result<Infallible> {
        let _ = io::stdout().flush();
        debug!(command = %spec, "replacing process");
        replace(spec)
    }

    fn spawn_background(
        &mut self,
        spec: &CommandSpec,
        logs: LogFiles,
    ) -> io::Result<Box<dyn BackgroundProcess>> {
        let mut command = spec.to_command();
        let _ = command
            .stdin(Stdio::null())
            .stdout(Stdio::from(logs.stdout))
            .stderr(Stdio::from(logs.stderr));
        detach_from_terminal(&mut command);
        let child = command.spawn()?;
        debug!(pid = child.id(), command = %spec, "spawned background process");
        Ok(Box::new(SystemChild { child }))
    }
}

/// Starts the child in a new process group, outside the terminal's foreground job.
#[cfg(unix)]
fn detach_from_terminal(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    let _ = command.process_group(0);
}

#[cfg(not(unix))]
fn detach_from_terminal(_command: &mut Command) {}

#[cfg(unix)]
fn replace(spec: &CommandSpec) -> io::Result<Infallible> {
    use std::os::unix::process::CommandExt;

    Err(spec.to_command().exec())
}

#[cfg(not(unix))]
fn replace(spec: &CommandSpec) -> io::Result<Infallible> {
    let status = spec.to_command().status()?;
    std::process::exit(status.code().unwrap_or(1))
}

/// A [`Child`] spawned by [`SystemRunner`].
#[derive(Debug)]
pub struct SystemChild {
    child: Child,
}

impl BackgroundProcess for SystemChild {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        let pid = libc::pid_t::try_from(self.child.id())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: kill(2) has no memory-safety preconditions; the pid belongs
        // to our own unreaped child, so it cannot have been recycled.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.child.kill()
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }
}
