// SPDX-License-Identifier: GPL-3.0-only

use pool_types::{Pool, PoolType, Volume};

/// Operation table implemented by every pool backend.
///
/// Calls are blocking and run to completion on the caller's thread. The
/// caller holds the pool's lock for the duration of each call; backends keep
/// no locks of their own.
pub trait PoolBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    fn pool_type(&self) -> PoolType;

    /// Whether the pool root is currently usable. Never fails.
    fn check_pool(&self, pool: &Pool) -> bool;

    /// Rescan the pool, replacing its volume collection and capacity figures.
    ///
    /// On failure the volume collection is left empty and capacity figures
    /// keep their previous values.
    fn refresh_pool(&self, pool: &mut Pool) -> Result<(), Self::Error>;

    /// Fill in type, target path and key of a new volume definition.
    fn create_vol(&self, pool: &Pool, volume: &mut Volume) -> Result<(), Self::Error>;

    /// Materialize a volume on disk. The caller appends it to the pool.
    fn build_vol(&self, pool: &Pool, volume: &Volume) -> Result<(), Self::Error>;

    fn delete_vol(&self, pool: &Pool, volume: &Volume) -> Result<(), Self::Error>;
}
