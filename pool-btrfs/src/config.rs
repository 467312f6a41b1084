// SPDX-License-Identifier: GPL-3.0-only

//! Backend configuration loaded from TOML.
//!
//! ```toml
//! btrfs_binary = "btrfs"
//! log_level = "info"
//!
//! [[pools]]
//! name = "images"
//! path = "/var/lib/pools/images"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pool_types::{Pool, PoolType};
use serde::{Deserialize, Serialize};

use crate::error::{BtrfsError, Result};

pub const DEFAULT_BTRFS_BINARY: &str = "btrfs";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Program name or path of the btrfs tool
    pub btrfs_binary: String,
    /// Default tracing directive when RUST_LOG is unset
    pub log_level: String,
    pub pools: Vec<PoolEntry>,
}

/// A pool defined in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub name: String,
    pub path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            btrfs_binary: DEFAULT_BTRFS_BINARY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            pools: Vec::new(),
        }
    }
}

impl BackendConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|error| {
            BtrfsError::Config(format!("cannot read {}: {}", path.display(), error))
        })?;

        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|error| BtrfsError::Config(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.btrfs_binary.trim().is_empty() {
            return Err(BtrfsError::Config(
                "btrfs_binary must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.pools {
            if entry.name.is_empty() {
                return Err(BtrfsError::Config("pool name must not be empty".to_string()));
            }
            if !entry.path.starts_with('/') {
                return Err(BtrfsError::Config(format!(
                    "pool '{}' path must be absolute: {}",
                    entry.name, entry.path
                )));
            }
            if entry.path.ends_with('/') {
                return Err(BtrfsError::Config(format!(
                    "pool '{}' path must not be the filesystem root or end with '/': {}",
                    entry.name, entry.path
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(BtrfsError::Config(format!(
                    "pool '{}' is defined more than once",
                    entry.name
                )));
            }
        }

        Ok(())
    }

    /// A fresh, unrefreshed pool for a configured entry.
    pub fn pool(&self, name: &str) -> Option<Pool> {
        self.pools
            .iter()
            .find(|entry| entry.name == name)
            .map(PoolEntry::to_pool)
    }

    /// A configured pool by name, or an ad-hoc pool for an absolute root.
    ///
    /// Trailing slashes on an ad-hoc root are dropped. The filesystem root
    /// itself is refused since volume paths are built as `root/name`.
    pub fn resolve_pool(&self, pool: &str) -> Result<Pool> {
        if let Some(configured) = self.pool(pool) {
            return Ok(configured);
        }

        if !pool.starts_with('/') {
            return Err(BtrfsError::Config(format!(
                "unknown pool '{pool}': not configured and not an absolute path"
            )));
        }

        let root = pool.trim_end_matches('/');
        let Some((_, name)) = root.rsplit_once('/') else {
            return Err(BtrfsError::Config(
                "the filesystem root cannot be used as a pool".to_string(),
            ));
        };

        Ok(Pool::new(name, PoolType::Btrfs, root))
    }
}

impl PoolEntry {
    pub fn to_pool(&self) -> Pool {
        Pool::new(&self.name, PoolType::Btrfs, &self.path)
    }
}
