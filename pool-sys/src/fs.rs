// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::unistd::{AccessFlags, access};

use crate::error::{Result, SysError};

/// Raw statvfs figures for a mounted filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FsUsage {
    /// Fragment size (f_frsize)
    pub fragment_size: u64,
    /// Total blocks in fragment units (f_blocks)
    pub blocks: u64,
    /// Free blocks (f_bfree)
    pub free_blocks: u64,
}

impl FsUsage {
    pub fn capacity(&self) -> u64 {
        self.fragment_size.saturating_mul(self.blocks)
    }

    pub fn available(&self) -> u64 {
        self.fragment_size.saturating_mul(self.free_blocks)
    }
}

/// Read-only view of the host filesystem needed by pool backends.
pub trait FilesystemProbe {
    fn usage(&self, path: &Path) -> Result<FsUsage>;

    /// Fails with the errno when the path is not readable and traversable
    /// by this process.
    fn check_access(&self, path: &Path) -> Result<()>;

    fn is_accessible(&self, path: &Path) -> bool {
        self.check_access(path).is_ok()
    }

    /// Whether anything exists at the path (following symlinks).
    fn exists(&self, path: &Path) -> bool;
}

/// The real host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFilesystem;

impl FilesystemProbe for HostFilesystem {
    // statvfs field widths differ between targets
    #[allow(clippy::unnecessary_cast)]
    fn usage(&self, path: &Path) -> Result<FsUsage> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| SysError::InvalidPath(format!("{}: {}", path.display(), e)))?;

        let mut stat: MaybeUninit<libc::statvfs> = MaybeUninit::uninit();
        let result = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };

        if result != 0 {
            return Err(SysError::Statvfs {
                path: path.to_path_buf(),
                source: std::io::Error::last_os_error(),
            });
        }

        let stat = unsafe { stat.assume_init() };

        Ok(FsUsage {
            fragment_size: stat.f_frsize as u64,
            blocks: stat.f_blocks as u64,
            free_blocks: stat.f_bfree as u64,
        })
    }

    fn check_access(&self, path: &Path) -> Result<()> {
        access(path, AccessFlags::R_OK | AccessFlags::X_OK).map_err(|source| SysError::Access {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}
