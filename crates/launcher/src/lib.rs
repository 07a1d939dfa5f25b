//! Launcher for RISC-V 64-bit kernels on QEMU's `virt` machine.
//!
//! This crate builds and executes the emulator and debugger invocations:
//! 1. **Config:** Emulator parameters (machine, CPU, SMP, memory, ports), loadable from JSON.
//! 2. **Commands:** Exact QEMU and GDB argument vectors for each action.
//! 3. **Kernel:** Presence and architecture checks on the kernel image.
//! 4. **Process:** Process replacement, background spawn, cleanup guard, and debug-port probing.
//! 5. **Launcher:** Orchestration of the run, DTB-dump, and debug actions.

/// Command construction (QEMU, GDB).
pub mod command;
/// Shared types (actions, errors).
pub mod common;
/// Launcher configuration (defaults, JSON loading, validated values).
pub mod config;
/// Kernel image inspection.
pub mod kernel;
/// Launch orchestration.
pub mod launcher;
/// Process runner traits and their OS implementation.
pub mod process;

/// Terminal action selected for one invocation.
pub use crate::common::Action;
/// Error type returned by every fallible operation.
pub use crate::common::{LaunchError, Result};
/// Emulator configuration; use `EmulatorConfig::default()` or load from JSON.
pub use crate::config::EmulatorConfig;
/// Orchestrator; construct with `Launcher::new(config, SystemRunner::new())`.
pub use crate::launcher::Launcher;
/// Operating-system process runner.
pub use crate::process::SystemRunner;
