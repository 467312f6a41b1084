// SPDX-License-Identifier: GPL-3.0-only

use std::collections::TryReserveError;

use pool_sys::SysError;
use thiserror::Error;

/// Error types for BTRFS pool operations
#[derive(Error, Debug)]
pub enum BtrfsError {
    #[error("failed to parse btrfs subvolume list: {reason} in line '{line}'")]
    Parse { line: String, reason: String },

    #[error("btrfs command failed: {0}")]
    Process(#[from] SysError),

    #[error("cannot read filesystem statistics for '{path}': {source}")]
    FilesystemStat {
        path: String,
        #[source]
        source: SysError,
    },

    #[error("inaccessible backing store volume {path}: {source}")]
    BackingStoreInaccessible {
        path: String,
        #[source]
        source: SysError,
    },

    #[error("failed to create {path}: target missing after btrfs reported success")]
    CreationVerification { path: String },

    #[error("volume target path '{0}' already exists")]
    VolumeExists(String),

    #[error("out of memory while building a volume path: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for BTRFS pool operations
pub type Result<T> = std::result::Result<T, BtrfsError>;
