// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// On-disk shape of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VolumeType {
    /// Directory-like container (subvolume or snapshot)
    #[default]
    Dir,
}

/// Where a volume lives on the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeTarget {
    /// Absolute path; empty until the backend assigns one
    pub path: String,
}

/// The volume a snapshot was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingStore {
    pub path: String,
}

/// A logical storage unit inside a pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Volume {
    /// Identifier unique within the pool, relative to the pool root
    pub name: String,
    /// Stable identifier handed to callers; equal to the target path
    pub key: String,
    #[serde(rename = "type")]
    pub volume_type: VolumeType,
    pub target: VolumeTarget,
    pub backing_store: Option<BackingStore>,
}

impl Volume {
    /// A bare definition carrying only a name, as submitted by a caller.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Request that this volume be created as a snapshot of `backing`.
    pub fn with_backing_store(mut self, backing: impl Into<String>) -> Self {
        self.backing_store = Some(BackingStore {
            path: backing.into(),
        });
        self
    }

    pub fn is_snapshot(&self) -> bool {
        self.backing_store.is_some()
    }

    pub fn backing_path(&self) -> Option<&str> {
        self.backing_store.as_ref().map(|backing| backing.path.as_str())
    }
}
