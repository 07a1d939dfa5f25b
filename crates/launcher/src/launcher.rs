//! Launch orchestration.
//!
//! [`Launcher`] turns a kernel path and an [`Action`] into exactly one terminal step:
//! 1. **Run:** replace this process with QEMU.
//! 2. **Dump DTB:** same, with `-machine dumpdtb=...` appended.
//! 3. **Debug:** spawn QEMU halted in the background, wait for its gdbstub, then
//!    replace this process with GDB. Any failure after the spawn terminates and
//!    reaps QEMU before the error is returned.
//!
//! With `dry_run` set, the commands are printed and nothing is spawned.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::command::{CommandSpec, gdb, qemu};
use crate::common::{Action, LaunchError, Result};
use crate::config::EmulatorConfig;
use crate::kernel;
use crate::process::{ChildGuard, LogFiles, ProcessRunner, probe};

/// Drives one launch through a [`ProcessRunner`], writing status lines to `W`.
#[derive(Debug)]
pub struct Launcher<R, W = io::Stdout> {
    config: EmulatorConfig,
    runner: R,
    out: W,
    dry_run: bool,
}

impl<R: ProcessRunner> Launcher<R> {
    /// Creates a launcher that prints status lines to stdout.
    pub fn new(config: EmulatorConfig, runner: R) -> Self {
        Self::with_output(config, runner, io::stdout())
    }
}

impl<R: ProcessRunner, W: Write> Launcher<R, W> {
    /// Creates a launcher that prints status lines to `out`.
    pub const fn with_output(config: EmulatorConfig, runner: R, out: W) -> Self {
        Self {
            config,
            runner,
            out,
            dry_run: false,
        }
    }

    /// Print the commands instead of running them.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Status output written so far.
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// The commands `action` would run, in order: QEMU, then GDB for [`Action::Debug`].
    pub fn plan(&self, kernel: &Path, action: Action) -> Vec<CommandSpec> {
        let emulator = qemu::build(&self.config, kernel, action);
        match action {
            Action::Run | Action::DumpDtb => vec![emulator],
            Action::Debug => vec![emulator, gdb::build(&self.config, kernel)],
        }
    }

    /// Performs `action` for `kernel`.
    ///
    /// Returns `Ok(())` only for dry runs; a successful launch hands the
    /// process over and never returns.
    ///
    /// # Errors
    ///
    /// Any [`LaunchError`]; after a debug-mode spawn, the background emulator
    /// has been terminated and reaped by the time the error is returned.
    pub fn launch(&mut self, kernel: &Path, action: Action) -> Result<()> {
        self.config.validate()?;

        if self.dry_run {
            for spec in self.plan(kernel, action) {
                status(&mut self.out, format_args!("{spec}"));
            }
            return Ok(());
        }

        let image = kernel::inspect(kernel)?;
        info!(%action, kernel = %image.path.display(), "launching");

        match action {
            Action::Run => {
                let spec = self.resolved(qemu::build(&self.config, kernel, action))?;
                status(&mut self.out, format_args!("Preparing to launch QEMU."));
                status(
                    &mut self.out,
                    format_args!("QEMU Path: {}", Path::new(spec.program()).display()),
                );
                status(
                    &mut self.out,
                    format_args!("QEMU Arguments: {}", spec.display_args()),
                );
                self.replace(&spec)
            }
            Action::DumpDtb => {
                let spec = self.resolved(qemu::build(&self.config, kernel, action))?;
                status(
                    &mut self.out,
                    format_args!("Dumping DTB file to {}", self.config.dtb_output.display()),
                );
                self.replace(&spec)
            }
            Action::Debug => self.debug(kernel),
        }
    }

    fn debug(&mut self, kernel: &Path) -> Result<()> {
        let emulator = self.resolved(qemu::build(&self.config, kernel, Action::Debug))?;
        let debugger = self.resolved(gdb::build(&self.config, kernel))?;
        let logs = LogFiles::create_now(&self.config.log_dir)?;

        status(
            &mut self.out,
            format_args!(
                "Starting QEMU in the background (stdout: {}, stderr: {})",
                logs.stdout_path.display(),
                logs.stderr_path.display()
            ),
        );
        let child = self
            .runner
            .spawn_background(&emulator, logs)
            .map_err(|source| LaunchError::Spawn {
                program: program_name(&emulator),
                source,
            })?;
        let mut guard = ChildGuard::new(child);
        let pid = guard.child_mut().id();
        let port = self.config.gdb_port;
        info!(pid, port, "emulator started, waiting for gdbstub");

        if let Err(e) = probe::wait_for_port(port, &self.config.probe, guard.child_mut()) {
            Self::cleanup(guard);
            return Err(e);
        }

        status(&mut self.out, format_args!("Launching GDB: {debugger}"));
        let error = self.replace(&debugger);
        Self::cleanup(guard);
        error
    }

    fn cleanup(guard: ChildGuard) {
        guard.shutdown().map_or_else(
            |e| warn!(error = %e, "failed to reap background emulator"),
            |status| info!(%status, "background emulator stopped"),
        );
    }

    fn resolved(&self, spec: CommandSpec) -> Result<CommandSpec> {
        let path = self.runner.resolve(spec.program())?;
        Ok(spec.with_program(path))
    }

    fn replace(&mut self, spec: &CommandSpec) -> Result<()> {
        let Err(source) = self.runner.exec(spec);
        Err(LaunchError::Exec {
            program: program_name(spec),
            source,
        })
    }
}

fn status<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    let _ = writeln!(out, "{line}");
}

fn program_name(spec: &CommandSpec) -> String {
    spec.program().to_string_lossy().into_owned()
}
