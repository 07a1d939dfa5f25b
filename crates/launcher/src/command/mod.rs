//! Command construction for the emulator and the debugger.
//!
//! Both external tools are described by a [`CommandSpec`]: an owned program
//! name plus argument vector. Building the vector is pure, so the exact flag
//! order the external tools expect can be checked without spawning anything.
//! 1. **QEMU:** [`qemu::build`] produces the `virt` invocation for each action.
//! 2. **GDB:** [`gdb::build`] produces the attach-and-layout invocation.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

/// Debugger invocation.
pub mod gdb;
/// Emulator invocation.
pub mod qemu;

/// A program and its arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandSpec {
    /// Creates a spec with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the program, keeping the arguments (used once the program is resolved on `PATH`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Program name or path.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments, excluding the program.
    pub fn args_slice(&self) -> &[OsString] {
        &self.args
    }

    /// Builds a [`Command`] with the program and arguments set and nothing else.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        let _ = command.args(&self.args);
        command
    }

    /// Renders the arguments alone, shell-quoted, separated by spaces.
    pub fn display_args(&self) -> String {
        self.args
            .iter()
            .map(|a| quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Double-quotes an argument when a shell would otherwise split it.
fn quote(arg: &OsStr) -> String {
    let text = arg.to_string_lossy();
    if text.is_empty() || text.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text.into_owned()
    }
}
