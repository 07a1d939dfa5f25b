//! Configuration for the launcher.
//!
//! This module defines the emulator and debugger parameters that shape every
//! invocation. It provides:
//! 1. **Defaults:** The fixed `virt` machine contract (machine, CPU model, SMP, memory, ports).
//! 2. **Structures:** [`EmulatorConfig`] and [`ProbeConfig`], deserializable from JSON.
//! 3. **Validated values:** [`MemorySize`], parsed from QEMU's `-m` syntax.
//!
//! Precedence is built-in defaults, then a JSON file ([`EmulatorConfig::from_file`]),
//! then whatever the caller overrides field by field.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::common::{LaunchError, Result};

/// Default configuration constants.
mod defaults {
    /// Emulator binary, resolved on `PATH`.
    pub const QEMU_BINARY: &str = "qemu-system-riscv64";

    /// Debugger binary, resolved on `PATH`.
    pub const GDB_BINARY: &str = "gdb-multiarch";

    /// QEMU board model.
    pub const MACHINE: &str = "virt";

    /// QEMU CPU model.
    pub const CPU_MODEL: &str = "rv64";

    /// Number of harts.
    pub const SMP: u32 = 2;

    /// Guest RAM. The 128M variant is reachable through `--memory`.
    pub const MEMORY: &str = "4G";

    /// Port for QEMU's gdbstub (`-s` is shorthand for `tcp::1234`).
    pub const GDB_PORT: u16 = 1234;

    /// File name QEMU writes the device tree to.
    pub const DTB_OUTPUT: &str = "virt.dtb";

    /// Directory for background emulator logs.
    pub const LOG_DIR: &str = ".";

    /// Connection attempts against the debug port.
    pub const PROBE_ATTEMPTS: u32 = 20;

    /// Delay between connection attempts, in milliseconds.
    pub const PROBE_BACKOFF_MS: u64 = 100;
}

/// Guest memory size in QEMU's `-m` syntax (`128M`, `4G`, bare digits meaning megabytes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MemorySize(String);

impl MemorySize {
    /// Returns the value exactly as it is passed to `-m`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MemorySize {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_suffix(['K', 'M', 'G', 'T', 'k', 'm', 'g', 't'])
            .unwrap_or(s);
        let valid = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && digits.bytes().any(|b| b != b'0');
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(LaunchError::InvalidMemorySize(s.to_owned()))
        }
    }
}

impl TryFrom<String> for MemorySize {
    type Error = LaunchError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl Default for MemorySize {
    fn default() -> Self {
        Self(defaults::MEMORY.to_owned())
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded connect-retry loop used to wait for the emulator's debug listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Maximum number of connection attempts.
    pub attempts: u32,
    /// Delay between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl ProbeConfig {
    /// Delay between attempts.
    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: defaults::PROBE_ATTEMPTS,
            backoff_ms: defaults::PROBE_BACKOFF_MS,
        }
    }
}

/// Emulator and debugger parameters shared by every action.
///
/// Every field is optional in JSON; missing fields take the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmulatorConfig {
    /// Emulator program name or path.
    pub qemu_binary: String,
    /// Debugger program name or path.
    pub gdb_binary: String,
    /// Board model passed to `-M`.
    pub machine: String,
    /// CPU model passed to `-cpu`.
    pub cpu_model: String,
    /// Hart count passed to `-smp`.
    pub smp: u32,
    /// Guest RAM passed to `-m`.
    pub memory: MemorySize,
    /// TCP port of the emulator's gdbstub.
    pub gdb_port: u16,
    /// Where the emulator writes the device tree when dumping.
    pub dtb_output: PathBuf,
    /// Directory receiving the background emulator's stdout/stderr logs.
    pub log_dir: PathBuf,
    /// Debug-port readiness probe.
    pub probe: ProbeConfig,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            qemu_binary: defaults::QEMU_BINARY.to_owned(),
            gdb_binary: defaults::GDB_BINARY.to_owned(),
            machine: defaults::MACHINE.to_owned(),
            cpu_model: defaults::CPU_MODEL.to_owned(),
            smp: defaults::SMP,
            memory: MemorySize::default(),
            gdb_port: defaults::GDB_PORT,
            dtb_output: PathBuf::from(defaults::DTB_OUTPUT),
            log_dir: PathBuf::from(defaults::LOG_DIR),
            probe: ProbeConfig::default(),
        }
    }
}

impl EmulatorConfig {
    /// Loads a JSON config file and validates it.
    ///
    /// # Errors
    ///
    /// [`LaunchError::ConfigRead`] if the file cannot be read, [`LaunchError::ConfigParse`]
    /// if it is not valid JSON for this structure (an invalid memory size surfaces here too),
    /// or any error from [`EmulatorConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| LaunchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| LaunchError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks constraints that the type system does not already enforce.
    ///
    /// # Errors
    ///
    /// [`LaunchError::InvalidCpuCount`] when `smp` is zero.
    pub const fn validate(&self) -> Result<()> {
        if self.smp == 0 {
            return Err(LaunchError::InvalidCpuCount(self.smp));
        }
        Ok(())
    }
}
