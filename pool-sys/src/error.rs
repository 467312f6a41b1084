// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("cannot statvfs path '{}': {source}", path.display())]
    Statvfs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot access '{}': {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0} not found in PATH")]
    ToolNotFound(String),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
