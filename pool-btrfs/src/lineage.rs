// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot lineage reconstruction.
//!
//! The uuid index is built from every record before any parent is looked
//! up, so a snapshot listed ahead of its origin still gets its backing
//! store. A parent uuid missing from the listing leaves the backing store
//! unset.

use std::collections::HashMap;

use pool_types::{BackingStore, Volume, VolumeTarget, VolumeType};
use tracing::warn;

use crate::error::Result;
use crate::listing::ListingRecord;
use crate::path::{child_path, resolve_path};

/// Build pool volumes from listing records, in record order.
pub fn resolve_lineage(root: &str, records: &[ListingRecord]) -> Result<Vec<Volume>> {
    // Later records win when a uuid repeats.
    let index: HashMap<&str, &str> = records
        .iter()
        .map(|record| (record.uuid.as_str(), record.path.as_str()))
        .collect();

    records
        .iter()
        .map(|record| -> Result<Volume> {
            let target = child_path(root, &record.path)?;

            let backing_store = match record.parent_uuid.as_deref() {
                None => None,
                Some(parent) => match index.get(parent) {
                    Some(origin) => Some(BackingStore {
                        path: resolve_path(root, origin)?,
                    }),
                    None => {
                        warn!(
                            "Snapshot {} refers to unknown parent uuid {}",
                            record.path, parent
                        );
                        None
                    }
                },
            };

            Ok(Volume {
                name: record.path.clone(),
                key: target.clone(),
                volume_type: VolumeType::Dir,
                target: VolumeTarget { path: target },
                backing_store,
            })
        })
        .collect()
}
