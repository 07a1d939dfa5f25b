//! # Command Construction Tests
//!
//! Argument vectors for QEMU and GDB. The flag order is an external contract,
//! so every test compares the full vector.

use pretty_assertions::assert_eq;
use std::path::Path;
use virtrun_core::command::{CommandSpec, gdb, qemu};
use virtrun_core::{Action, EmulatorConfig};

fn args(spec: &CommandSpec) -> Vec<String> {
    spec.args_slice()
        .iter()
        .map(|a| a.to_str().unwrap().to_owned())
        .collect()
}

fn base_args() -> Vec<&'static str> {
    vec![
        "-M",
        "virt",
        "-cpu",
        "rv64",
        "-smp",
        "2",
        "-m",
        "4G",
        "-nographic",
        "-serial",
        "mon:stdio",
        "-bios",
        "none",
        "-kernel",
        "build/kernel.elf",
    ]
}

#[test]
fn test_run_argument_order() {
    let config = EmulatorConfig::default();
    let spec = qemu::build(&config, Path::new("build/kernel.elf"), Action::Run);
    assert_eq!(spec.program(), "qemu-system-riscv64");
    assert_eq!(args(&spec), base_args());
}

#[test]
fn test_dump_dtb_appends_machine_flag() {
    let config = EmulatorConfig::default();
    let spec = qemu::build(&config, Path::new("build/kernel.elf"), Action::DumpDtb);
    let mut expected = base_args();
    expected.extend(["-machine", "dumpdtb=virt.dtb"]);
    assert_eq!(args(&spec), expected);
}

#[test]
fn test_dump_dtb_path_commas_are_escaped() {
    let config = EmulatorConfig {
        dtb_output: "out,v2/virt,board.dtb".into(),
        ..EmulatorConfig::default()
    };
    let spec = qemu::build(&config, Path::new("build/kernel.elf"), Action::DumpDtb);
    let mut expected = base_args();
    expected.extend(["-machine", "dumpdtb=out,,v2/virt,,board.dtb"]);
    assert_eq!(args(&spec), expected);
}

#[test]
fn test_debug_appends_listener_and_halt() {
    let config = EmulatorConfig::default();
    let spec = qemu::build(&config, Path::new("build/kernel.elf"), Action::Debug);
    let mut expected = base_args();
    expected.extend(["-gdb", "tcp::1234", "-S"]);
    assert_eq!(args(&spec), expected);
}

#[test]
fn test_configured_memory_smp_and_binary() {
    let config = EmulatorConfig {
        memory: "128M".parse().unwrap(),
        smp: 4,
        qemu_binary: "/opt/qemu/bin/qemu-system-riscv64".to_owned(),
        ..EmulatorConfig::default()
    };
    let spec = qemu::build(&config, Path::new("k"), Action::Run);
    assert_eq!(spec.program(), "/opt/qemu/bin/qemu-system-riscv64");
    let a = args(&spec);
    assert_eq!(&a[4..8], ["-smp", "4", "-m", "128M"]);
    assert_eq!(a.last().unwrap(), "k");
}

#[test]
fn test_gdb_attaches_to_the_emulator_port() {
    let config = EmulatorConfig {
        gdb_port: 4321,
        ..EmulatorConfig::default()
    };
    let emulator = qemu::build(&config, Path::new("build/kernel.elf"), Action::Debug);
    let debugger = gdb::build(&config, Path::new("build/kernel.elf"));

    assert!(args(&emulator).contains(&"tcp::4321".to_owned()));
    assert_eq!(debugger.program(), "gdb-multiarch");
    assert_eq!(
        args(&debugger),
        [
            "build/kernel.elf",
            "-ex",
            "set architecture riscv:rv64",
            "-ex",
            "target remote localhost:4321",
            "-ex",
            "layout asm",
            "-ex",
            "layout regs",
        ]
    );
}

#[test]
fn test_listener_and_remote_target_agree() {
    assert_eq!(qemu::gdb_listener(1234), "tcp::1234");
    assert_eq!(gdb::remote_target(1234), "localhost:1234");
}

#[test]
fn test_same_inputs_build_identical_commands() {
    let config = EmulatorConfig::default();
    let kernel = Path::new("build/kernel.elf");
    for action in [Action::Run, Action::DumpDtb, Action::Debug] {
        assert_eq!(
            qemu::build(&config, kernel, action),
            qemu::build(&config, kernel, action)
        );
    }
}

#[test]
fn test_display_matches_shell_form() {
    let config = EmulatorConfig::default();
    let debugger = gdb::build(&config, Path::new("kernel.elf"));
    assert_eq!(
        debugger.to_string(),
        "gdb-multiarch kernel.elf -ex \"set architecture riscv:rv64\" \
         -ex \"target remote localhost:1234\" -ex \"layout asm\" -ex \"layout regs\""
    );
}
