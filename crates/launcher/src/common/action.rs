//! Terminal action selection.

use std::fmt;

use super::error::{LaunchError, Result};

/// The single terminal action performed by one launcher invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Replace this process with the emulator.
    #[default]
    Run,
    /// Ask the emulator to write the board's device tree, then replace this process with it.
    DumpDtb,
    /// Start the emulator halted in the background and hand this process over to the debugger.
    Debug,
}

impl Action {
    /// Selects the action from the two mutually exclusive flags.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ConflictingActions`] when both flags are set.
    pub const fn from_flags(gdb: bool, dump_dtb: bool) -> Result<Self> {
        match (gdb, dump_dtb) {
            (true, true) => Err(LaunchError::ConflictingActions),
            (true, false) => Ok(Self::Debug),
            (false, true) => Ok(Self::DumpDtb),
            (false, false) => Ok(Self::Run),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::DumpDtb => write!(f, "dump-dtb"),
            Self::Debug => write!(f, "debug"),
        }
    }
}
