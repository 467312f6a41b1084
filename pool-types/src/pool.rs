// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::volume::Volume;

/// Kind of backend that manages a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    Btrfs,
}

impl PoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolType::Btrfs => "btrfs",
        }
    }
}

/// Where a pool lives on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTarget {
    /// Absolute root directory of the pool
    pub path: String,
}

/// Raw capacity figures reported by the filesystem backing a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolUsage {
    pub capacity: u64,
    pub available: u64,
}

/// A named root directory managed as a container of volumes.
///
/// `allocation` is never written on its own: it is derived from `capacity`
/// and `available` every time usage is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub pool_type: PoolType,
    pub target: PoolTarget,
    capacity: u64,
    allocation: u64,
    available: u64,
    pub volumes: Vec<Volume>,
}

impl Pool {
    pub fn new(name: impl Into<String>, pool_type: PoolType, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool_type,
            target: PoolTarget { path: path.into() },
            capacity: 0,
            allocation: 0,
            available: 0,
            volumes: Vec::new(),
        }
    }

    /// Root directory of the pool
    pub fn root(&self) -> &str {
        &self.target.path
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn allocation(&self) -> u64 {
        self.allocation
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    /// Replace capacity figures, recomputing allocation from them.
    pub fn apply_usage(&mut self, usage: PoolUsage) {
        self.capacity = usage.capacity;
        self.available = usage.available;
        self.allocation = usage.capacity.saturating_sub(usage.available);
    }

    pub fn find_volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|volume| volume.name == name)
    }
}
