use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::common::{LaunchError, Result};

/// Open stdout/stderr capture files for the background emulator.
///
/// Named `qemu-<unix-seconds>.stdout.log` and `qemu-<unix-seconds>.stderr.log`.
/// Existing logs are never overwritten: a second launch within the same second
/// gets `qemu-<unix-seconds>-1.*`, then `-2`, and so on.
#[derive(Debug)]
pub struct LogFiles {
    /// Path of the stdout capture.
    pub stdout_path: PathBuf,
    /// Path of the stderr capture.
    pub stderr_path: PathBuf,
    /// Handle receiving stdout.
    pub stdout: File,
    /// Handle receiving stderr.
    pub stderr: File,
}

/// Collision suffixes tried for one timestamp before giving up.
const MAX_SUFFIX: u32 = 100;

impl LogFiles {
    /// Creates a fresh pair of files in `dir` for the given timestamp.
    ///
    /// # Errors
    ///
    /// [`LaunchError::LogFile`] naming whichever file could not be created, or
    /// the unsuffixed stdout path once every suffix is taken.
    pub fn create(dir: &Path, timestamp: u64) -> Result<Self> {
        for suffix in 0..MAX_SUFFIX {
            let stem = if suffix == 0 {
                format!("qemu-{timestamp}")
            } else {
                format!("qemu-{timestamp}-{suffix}")
            };
            let stdout_path = dir.join(format!("{stem}.stdout.log"));
            let Some(stdout) = open_new(&stdout_path)? else {
                continue;
            };
            let stderr_path = dir.join(format!("{stem}.stderr.log"));
            let Some(stderr) = open_new(&stderr_path)? else {
                drop(stdout);
                let _ = fs::remove_file(&stdout_path);
                continue;
            };
            return Ok(Self {
                stdout_path,
                stderr_path,
                stdout,
                stderr,
            });
        }
        Err(LaunchError::LogFile {
            path: dir.join(format!("qemu-{timestamp}.stdout.log")),
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        })
    }

    /// Creates both files in `dir` stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`LogFiles::create`].
    pub fn create_now(dir: &Path) -> Result<Self> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self::create(dir, timestamp)
    }
}

/// Creates `path`, or returns `None` if it already exists.
fn open_new(path: &Path) -> Result<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(source) => Err(LaunchError::LogFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
