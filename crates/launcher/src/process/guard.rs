use std::fmt;
use std::io;
use std::process::ExitStatus;

use tracing::{debug, warn};

use super::BackgroundProcess;

/// Owns a background child and guarantees it is terminated and reaped.
///
/// Call [`ChildGuard::shutdown`] on error paths to observe the outcome; if the
/// guard is dropped while still armed, `Drop` does the same thing silently.
pub struct ChildGuard {
    child: Box<dyn BackgroundProcess>,
    armed: bool,
}

impl ChildGuard {
    /// Takes ownership of `child`.
    pub const fn new(child: Box<dyn BackgroundProcess>) -> Self {
        Self { child, armed: true }
    }

    /// The guarded child.
    pub fn child_mut(&mut self) -> &mut dyn BackgroundProcess {
        self.child.as_mut()
    }

    /// Requests termination, then waits for the child to exit.
    ///
    /// A failed termination request (typically because the child already
    /// exited) is logged and does not prevent the wait.
    ///
    /// # Errors
    ///
    /// The error from waiting on the child.
    pub fn shutdown(mut self) -> io::Result<ExitStatus> {
        self.armed = false;
        let pid = self.child.id();
        if let Err(e) = self.child.terminate() {
            warn!(pid, error = %e, "failed to signal background emulator");
        }
        let status = self.child.wait()?;
        debug!(pid, %status, "background emulator reaped");
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.child.terminate();
            let _ = self.child.wait();
        }
    }
}

impl fmt::Debug for ChildGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildGuard")
            .field("pid", &self.child.id())
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
