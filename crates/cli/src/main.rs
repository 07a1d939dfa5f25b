//! RISC-V `virt` launcher CLI.
//!
//! This binary provides a single entry point for booting a kernel under QEMU. It performs:
//! 1. **Direct run:** Replace this process with `qemu-system-riscv64` for the given kernel.
//! 2. **DTB dump:** Same invocation with `-machine dumpdtb=virt.dtb`.
//! 3. **Debug:** Start QEMU halted in the background, wait for its gdbstub, then hand over to GDB.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use virtrun_core::config::MemorySize;
use virtrun_core::{Action, EmulatorConfig, LaunchError, Launcher, SystemRunner};

#[derive(Parser, Debug)]
#[command(
    name = "virtrun",
    author,
    version,
    about = "Run a RISC-V 64-bit kernel on QEMU's virt machine",
    long_about = "Run a RISC-V 64-bit kernel on QEMU's virt machine, dump its device tree, or debug it under GDB.\n\nExamples:\n  virtrun --kernel build/kernel.elf\n  virtrun --kernel build/kernel.elf --dump-dtb\n  virtrun --kernel build/kernel.elf --gdb --memory 128M"
)]
struct Cli {
    /// Kernel image (ELF or flat binary) passed to `-kernel`.
    #[arg(short, long, visible_alias = "kernel-elf", value_name = "PATH")]
    kernel: PathBuf,

    /// Run QEMU in the background and attach GDB to it.
    #[arg(long, conflicts_with = "dump_dtb")]
    gdb: bool,

    /// Dump the virt machine's device tree to virt.dtb.
    #[arg(long)]
    dump_dtb: bool,

    /// Guest RAM in QEMU syntax (e.g. 128M, 4G).
    #[arg(short, long, value_name = "SIZE")]
    memory: Option<MemorySize>,

    /// Number of harts.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    smp: Option<u32>,

    /// TCP port for QEMU's gdbstub.
    #[arg(long, value_name = "PORT")]
    gdb_port: Option<u16>,

    /// Emulator binary.
    #[arg(long, value_name = "BIN")]
    qemu: Option<String>,

    /// Debugger binary.
    #[arg(long, value_name = "BIN")]
    gdb_binary: Option<String>,

    /// Directory for the background emulator's logs (debug mode).
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// JSON file with emulator settings; flags override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the commands instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layers the config file (if any) and then the flags over the defaults.
    fn emulator_config(&self) -> Result<EmulatorConfig, LaunchError> {
        let mut config = match &self.config {
            Some(path) => EmulatorConfig::from_file(path)?,
            None => EmulatorConfig::default(),
        };
        if let Some(memory) = &self.memory {
            config.memory = memory.clone();
        }
        if let Some(smp) = self.smp {
            config.smp = smp;
        }
        if let Some(port) = self.gdb_port {
            config.gdb_port = port;
        }
        if let Some(qemu) = &self.qemu {
            config.qemu_binary.clone_from(qemu);
        }
        if let Some(gdb) = &self.gdb_binary {
            config.gdb_binary.clone_from(gdb);
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir.clone_from(dir);
        }
        config.validate()?;
        Ok(config)
    }

    const fn action(&self) -> Result<Action, LaunchError> {
        Action::from_flags(self.gdb, self.dump_dtb)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected action. Returns only for dry runs or on failure.
fn run(cli: &Cli) -> Result<(), LaunchError> {
    let action = cli.action()?;
    let config = cli.emulator_config()?;
    let mut launcher = Launcher::new(config, SystemRunner::new()).dry_run(cli.dry_run);
    launcher.launch(&cli.kernel, action)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Prints the error and its source chain to stderr.
fn report(error: &LaunchError) {
    eprintln!("error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
