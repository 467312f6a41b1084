// SPDX-License-Identifier: GPL-3.0-only

pub mod traits;

pub use traits::PoolBackend;
