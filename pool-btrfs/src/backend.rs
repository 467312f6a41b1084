// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use pool_contracts::PoolBackend;
use pool_sys::{
    CommandInvocation, CommandRunner, FilesystemProbe, HostFilesystem, SystemRunner, locate_tool,
};
use pool_types::{Pool, PoolType, PoolUsage, Volume, VolumeType};
use tracing::{debug, info, warn};

use crate::config::{BackendConfig, DEFAULT_BTRFS_BINARY};
use crate::error::{BtrfsError, Result};
use crate::lineage::resolve_lineage;
use crate::listing::list_subvolumes;
use crate::path::resolve_path;

/// Pool backend that keeps volumes as BTRFS subvolumes and snapshots.
///
/// Commands go through `R` and filesystem queries through `F`, which default
/// to the host implementations.
#[derive(Debug, Clone)]
pub struct BtrfsBackend<R = SystemRunner, F = HostFilesystem> {
    binary: String,
    runner: R,
    fs: F,
}

impl BtrfsBackend {
    /// Backend using `btrfs` from `PATH` and the host filesystem.
    pub fn new() -> Self {
        Self::with_parts(DEFAULT_BTRFS_BINARY, SystemRunner, HostFilesystem)
    }

    /// Backend using the configured tool, which must be locatable.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let binary = locate_tool(&config.btrfs_binary)?;
        info!("Using btrfs binary at {:?}", binary);
        Ok(Self::with_parts(
            binary.to_string_lossy(),
            SystemRunner,
            HostFilesystem,
        ))
    }
}

impl Default for BtrfsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, F: FilesystemProbe> BtrfsBackend<R, F> {
    pub fn with_parts(binary: impl Into<String>, runner: R, fs: F) -> Self {
        Self {
            binary: binary.into(),
            runner,
            fs,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn subvolume_command(&self) -> CommandInvocation {
        CommandInvocation::new(&self.binary).arg("subvolume")
    }

    fn run(&self, invocation: CommandInvocation) -> Result<()> {
        debug!("Issuing {}", invocation.render());
        self.runner.run(&invocation)?;
        Ok(())
    }

    /// Everything a refresh commits, computed without touching the pool.
    fn scan(&self, root: &str) -> Result<(Vec<Volume>, PoolUsage)> {
        let records = list_subvolumes(&self.runner, &self.binary, root)?;
        let volumes = resolve_lineage(root, &records)?;

        let usage = self
            .fs
            .usage(Path::new(root))
            .map_err(|source| BtrfsError::FilesystemStat {
                path: root.to_string(),
                source,
            })?;

        Ok((
            volumes,
            PoolUsage {
                capacity: usage.capacity(),
                available: usage.available(),
            },
        ))
    }

    /// Path a volume definition is materialized at.
    fn target_of(&self, pool: &Pool, volume: &Volume) -> Result<String> {
        let name = if volume.target.path.is_empty() {
            &volume.name
        } else {
            &volume.target.path
        };
        resolve_path(pool.root(), name)
    }
}

impl<R: CommandRunner, F: FilesystemProbe> PoolBackend for BtrfsBackend<R, F> {
    type Error = BtrfsError;

    fn pool_type(&self) -> PoolType {
        PoolType::Btrfs
    }

    fn check_pool(&self, pool: &Pool) -> bool {
        self.fs.is_accessible(Path::new(pool.root()))
    }

    fn refresh_pool(&self, pool: &mut Pool) -> Result<()> {
        pool.volumes.clear();

        match self.scan(pool.root()) {
            Ok((volumes, usage)) => {
                pool.volumes = volumes;
                pool.apply_usage(usage);
                info!(
                    "Refreshed pool {}: {} volumes, capacity {} allocation {} available {}",
                    pool.name,
                    pool.volumes.len(),
                    pool.capacity(),
                    pool.allocation(),
                    pool.available()
                );
                Ok(())
            }
            Err(err) => {
                warn!("Failed to refresh pool {}: {}", pool.name, err);
                Err(err)
            }
        }
    }

    fn create_vol(&self, pool: &Pool, volume: &mut Volume) -> Result<()> {
        volume.volume_type = VolumeType::Dir;
        volume.target.path = resolve_path(pool.root(), &volume.name)?;

        if self.fs.exists(Path::new(&volume.target.path)) {
            return Err(BtrfsError::VolumeExists(volume.target.path.clone()));
        }

        volume.key = volume.target.path.clone();
        Ok(())
    }

    fn build_vol(&self, pool: &Pool, volume: &Volume) -> Result<()> {
        let target = self.target_of(pool, volume)?;

        let invocation = match volume.backing_path() {
            None => self.subvolume_command().arg("create").arg(&target),
            Some(backing) => {
                let source = resolve_path(pool.root(), backing)?;
                self.fs
                    .check_access(Path::new(&source))
                    .map_err(|source| BtrfsError::BackingStoreInaccessible {
                        path: backing.to_string(),
                        source,
                    })?;
                self.subvolume_command()
                    .arg("snapshot")
                    .arg(source)
                    .arg(&target)
            }
        };

        self.run(invocation)?;

        if !self.fs.exists(Path::new(&target)) {
            return Err(BtrfsError::CreationVerification { path: target });
        }

        info!("Built volume {} at {}", volume.name, target);
        Ok(())
    }

    fn delete_vol(&self, pool: &Pool, volume: &Volume) -> Result<()> {
        let target = self.target_of(pool, volume)?;
        self.run(self.subvolume_command().arg("delete").arg(&target))?;
        info!("Deleted volume {} at {}", volume.name, target);
        Ok(())
    }
}
