//! Types shared across the launcher.
//!
//! 1. **Actions:** the three mutually exclusive things one invocation can do.
//! 2. **Errors:** the [`LaunchError`] taxonomy and crate-wide `Result` alias.

/// Action selection from command-line flags.
pub mod action;

/// Error types.
pub mod error;

pub use action::Action;
pub use error::{LaunchError, Result};
