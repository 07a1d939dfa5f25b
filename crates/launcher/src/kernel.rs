//! Kernel image inspection.
//!
//! QEMU accepts both ELF files and flat images for `-kernel`. Before anything is
//! spawned the launcher checks:
//! 1. **Presence:** The path names an existing regular file.
//! 2. **Architecture:** ELF images are parsed with `object`; anything other than
//!    RISC-V 64 is reported with a warning but still launched.

use std::fs;
use std::path::{Path, PathBuf};

use object::{Architecture, Object};
use tracing::{debug, warn};

use crate::common::{LaunchError, Result};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// What the launcher learned about the kernel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFormat {
    /// A parseable ELF with the given architecture.
    Elf(Architecture),
    /// Not an ELF (or an ELF `object` could not parse); passed through untouched.
    Raw,
}

/// A kernel image that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelImage {
    /// Path as supplied by the caller.
    pub path: PathBuf,
    /// Detected format.
    pub format: KernelFormat,
}

impl KernelImage {
    /// Returns `true` if the image is an ELF for some other architecture than RV64.
    pub fn is_foreign_elf(&self) -> bool {
        matches!(self.format, KernelFormat::Elf(arch) if arch != Architecture::Riscv64)
    }
}

/// Checks that `path` is a readable regular file and detects its format.
///
/// # Errors
///
/// [`LaunchError::KernelNotFound`] if the path is missing or not a file,
/// [`LaunchError::KernelRead`] if it cannot be read.
pub fn inspect(path: &Path) -> Result<KernelImage> {
    let is_file = fs::metadata(path).is_ok_and(|m| m.is_file());
    if !is_file {
        return Err(LaunchError::KernelNotFound {
            path: path.to_path_buf(),
        });
    }

    let data = fs::read(path).map_err(|source| LaunchError::KernelRead {
        path: path.to_path_buf(),
        source,
    })?;

    let format = if data.starts_with(ELF_MAGIC) {
        object::File::parse(&*data).map_or_else(
            |e| {
                debug!(path = %path.display(), error = %e, "ELF magic present but parse failed");
                KernelFormat::Raw
            },
            |file| KernelFormat::Elf(file.architecture()),
        )
    } else {
        KernelFormat::Raw
    };

    let image = KernelImage {
        path: path.to_path_buf(),
        format,
    };
    if image.is_foreign_elf() {
        warn!(
            path = %path.display(),
            arch = ?format,
            "kernel ELF is not RISC-V 64; QEMU will likely fail to boot it"
        );
    } else {
        debug!(path = %path.display(), ?format, "kernel image inspected");
    }
    Ok(image)
}
