//! QEMU `virt` invocation.
//!
//! The base vector is fixed in shape and order:
//! `-M <machine> -cpu <model> -smp <n> -m <size> -nographic -serial mon:stdio -bios none -kernel <path>`.
//! Each action appends its own flags after the kernel.

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use super::CommandSpec;
use crate::common::Action;
use crate::config::EmulatorConfig;

/// Builds the base invocation shared by all actions.
pub fn base(config: &EmulatorConfig, kernel: &Path) -> CommandSpec {
    CommandSpec::new(&config.qemu_binary)
        .args(["-M", config.machine.as_str()])
        .args(["-cpu", config.cpu_model.as_str()])
        .args(["-smp".to_owned(), config.smp.to_string()])
        .args(["-m", config.memory.as_str()])
        .arg("-nographic")
        .args(["-serial", "mon:stdio"])
        .args(["-bios", "none"])
        .arg("-kernel")
        .arg(kernel)
}

/// Builds the invocation for `action`.
///
/// * [`Action::Run`]: the base vector.
/// * [`Action::DumpDtb`]: `-machine dumpdtb=<dtb_output>` appended (see [`dumpdtb_property`]).
/// * [`Action::Debug`]: `-gdb tcp::<port>` (listener) and `-S` (halt at startup) appended.
pub fn build(config: &EmulatorConfig, kernel: &Path, action: Action) -> CommandSpec {
    let spec = base(config, kernel);
    let spec = match action {
        Action::Run => spec,
        Action::DumpDtb => spec.args([
            OsString::from("-machine"),
            dumpdtb_property(&config.dtb_output),
        ]),
        Action::Debug => spec
            .args(["-gdb".to_owned(), gdb_listener(config.gdb_port)])
            .arg("-S"),
    };
    debug!(%action, command = %spec, "built emulator command");
    spec
}

/// `dumpdtb=<path>` for `-machine`. QEMU splits option values on `,`, so
/// commas in the path are doubled.
pub fn dumpdtb_property(path: &Path) -> OsString {
    let escaped = path.to_str().map_or_else(
        || path.as_os_str().to_owned(),
        |text| OsString::from(text.replace(',', ",,")),
    );
    let mut property = OsString::from("dumpdtb=");
    property.push(escaped);
    property
}

/// QEMU chardev spec for the gdbstub; `tcp::1234` is what `-s` expands to.
pub fn gdb_listener(port: u16) -> String {
    format!("tcp::{port}")
}
