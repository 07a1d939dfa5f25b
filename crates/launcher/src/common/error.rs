//! Launch error definitions.
//!
//! Every failure the launcher can report is a variant of [`LaunchError`]. The
//! taxonomy follows the order in which failures can occur:
//! 1. **Selection and validation:** conflicting action flags, malformed config values.
//! 2. **Inputs:** missing kernel image, unreadable config file.
//! 3. **Subprocesses:** binary resolution, log files, spawn, process replacement.
//! 4. **Debug orchestration:** the remote-debug port never opened, or the emulator died first.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = LaunchError> = std::result::Result<T, E>;

/// Errors produced while building or executing a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Both `--gdb` and `--dump-dtb` were requested.
    #[error("--gdb and --dump-dtb are mutually exclusive")]
    ConflictingActions,

    /// Memory size is not of the form `<digits>[K|M|G|T]` or is zero.
    #[error("invalid memory size '{0}' (expected e.g. 128M or 4G)")]
    InvalidMemorySize(String),

    /// CPU count must be at least one.
    #[error("invalid cpu count {0} (must be at least 1)")]
    InvalidCpuCount(u32),

    /// The kernel image does not exist or is not a regular file.
    #[error("kernel image not found: {}", path.display())]
    KernelNotFound {
        /// Path supplied by the caller.
        path: PathBuf,
    },

    /// The kernel image exists but could not be read for inspection.
    #[error("failed to read kernel image {}", path.display())]
    KernelRead {
        /// Path supplied by the caller.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The JSON configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The JSON configuration file is malformed.
    #[error("failed to parse config file {}", path.display())]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The program could not be located on `PATH`.
    #[error("'{program}' not found on PATH")]
    BinaryNotFound {
        /// Program name as configured.
        program: String,
        /// Resolution error.
        #[source]
        source: which::Error,
    },

    /// A log file for the background emulator could not be created.
    #[error("failed to create log file {}", path.display())]
    LogFile {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The background emulator could not be spawned.
    #[error("failed to launch {program}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Replacing the current process image failed.
    #[error("failed to exec {program}")]
    Exec {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Polling the background emulator for exit failed.
    #[error("failed to poll background emulator")]
    Poll(#[source] io::Error),

    /// The remote-debug port never accepted a connection.
    #[error("debug port {port} did not open after {attempts} attempts")]
    DebugPortUnavailable {
        /// Port the emulator was told to listen on.
        port: u16,
        /// Number of connection attempts made.
        attempts: u32,
    },

    /// The emulator exited before its debug port became ready.
    #[error("emulator exited before the debug port opened ({status})")]
    EmulatorExited {
        /// Exit status reported for the emulator.
        status: ExitStatus,
    },
}
