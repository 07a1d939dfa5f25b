//! GDB attach invocation.

use std::path::Path;

use tracing::debug;

use super::CommandSpec;
use crate::config::EmulatorConfig;

/// Architecture name GDB uses for RV64.
pub const ARCHITECTURE: &str = "riscv:rv64";

/// Builds `gdb <kernel> -ex "set architecture ..." -ex "target remote localhost:<port>"`
/// followed by the disassembly and register layouts.
///
/// The kernel is passed positionally so GDB loads its symbols.
pub fn build(config: &EmulatorConfig, kernel: &Path) -> CommandSpec {
    let spec = CommandSpec::new(&config.gdb_binary)
        .arg(kernel)
        .args(["-ex".to_owned(), format!("set architecture {ARCHITECTURE}")])
        .args([
            "-ex".to_owned(),
            format!("target remote {}", remote_target(config.gdb_port)),
        ])
        .args(["-ex", "layout asm"])
        .args(["-ex", "layout regs"]);
    debug!(command = %spec, "built debugger command");
    spec
}

/// `host:port` GDB attaches to.
pub fn remote_target(port: u16) -> String {
    format!("localhost:{port}")
}
