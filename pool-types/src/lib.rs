// SPDX-License-Identifier: GPL-3.0-only

//! Canonical data models for copy-on-write storage pools
//!
//! These models are shared by every layer of the stack:
//!
//! - **pool-contracts**: backend operation signatures are expressed in them
//! - **pool-btrfs**: populates and mutates them while talking to the `btrfs` tool
//! - **pool-btrfs-cli**: serializes them as JSON for callers
//!
//! A [`Pool`] owns its [`Volume`] collection. Backends replace that collection
//! wholesale on refresh and never hand out references into it.

pub mod pool;
pub mod volume;

pub use pool::{Pool, PoolTarget, PoolType, PoolUsage};
pub use volume::{BackingStore, Volume, VolumeTarget, VolumeType};
