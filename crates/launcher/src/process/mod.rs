//! Process handoff and background-process supervision.
//!
//! The launcher talks to the operating system only through the two traits
//! defined here, so the orchestration in [`crate::launcher`] can be driven by
//! mocks in tests. It provides:
//! 1. **Runner:** [`ProcessRunner`] resolves programs, replaces the current process, or spawns in the background.
//! 2. **Children:** [`BackgroundProcess`] polls, terminates, and reaps a spawned child.
//! 3. **Cleanup:** [`ChildGuard`] terminates and reaps its child on every path except a successful handoff.
//! 4. **Readiness:** [`probe::wait_for_port`] replaces a fixed startup sleep with a bounded connect-retry loop.
//! 5. **Logs:** [`LogFiles`] are the timestamped stdout/stderr captures of the background emulator.

use std::convert::Infallible;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::command::CommandSpec;
use crate::common::Result;

/// Scope guard owning a background child.
pub mod guard;
/// Timestamped log files for the background emulator.
pub mod logs;
/// Debug-port readiness probe.
pub mod probe;
/// Operating-system implementation of the runner traits.
pub mod system;

pub use guard::ChildGuard;
pub use logs::LogFiles;
pub use system::SystemRunner;

/// A child process running in the background.
pub trait BackgroundProcess {
    /// OS process id.
    fn id(&self) -> u32;

    /// Returns the exit status if the child has already exited, without blocking.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Requests termination (SIGTERM on unix). Does not wait.
    fn terminate(&mut self) -> io::Result<()>;

    /// Blocks until the child exits and reaps it.
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

/// Creates processes on behalf of the launcher.
pub trait ProcessRunner {
    /// Locates `program` on `PATH` (or accepts it as-is when it is already a path).
    ///
    /// # Errors
    ///
    /// [`crate::LaunchError::BinaryNotFound`] if the program cannot be located.
    fn resolve(&self, program: &OsStr) -> Result<PathBuf>;

    /// Replaces the current process with `spec`.
    ///
    /// On success control never comes back to the caller: either the process
    /// image is replaced, or (where replacement is unavailable) the child is
    /// awaited and this process exits with its status. Returns only on failure.
    ///
    /// # Errors
    ///
    /// The OS error that prevented the program from starting.
    fn exec(&mut self, spec: &CommandSpec) -> io::Result<Infallible>;

    /// Spawns `spec` with stdin detached and stdout/stderr redirected to `logs`.
    ///
    /// The child must not share the terminal's foreground job, so keyboard
    /// interrupts meant for whatever runs in front never reach it.
    ///
    /// # Errors
    ///
    /// The OS error that prevented the program from starting.
    fn spawn_background(
        &mut self,
        spec: &CommandSpec,
        logs: LogFiles,
    ) -> io::Result<Box<dyn BackgroundProcess>>;
}
