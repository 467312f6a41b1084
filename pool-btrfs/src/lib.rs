// SPDX-License-Identifier: GPL-3.0-only

//! BTRFS backed storage pools
//!
//! Volumes of a pool are the subvolumes and snapshots below its root
//! directory. All on-disk work is delegated to the `btrfs` tool; this crate
//! decides which commands to issue and reconciles their output into the
//! [`Pool`](pool_types::Pool) model:
//!
//! - [`listing`] parses `btrfs subvolume list -uq`
//! - [`lineage`] turns the parsed records into volumes with backing stores
//! - [`BtrfsBackend`] drives refresh, build and delete on top of both

pub mod backend;
pub mod config;
pub mod error;
pub mod lineage;
pub mod listing;
pub mod path;

pub use backend::BtrfsBackend;
pub use config::{BackendConfig, PoolEntry};
pub use error::{BtrfsError, Result};
pub use lineage::resolve_lineage;
pub use listing::{ListingRecord, decode_listing, list_subvolumes, parse_listing};
pub use path::resolve_path;

// Re-export shared models and the backend contract
pub use pool_contracts::PoolBackend;
pub use pool_types::*;
