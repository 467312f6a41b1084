// SPDX-License-Identifier: GPL-3.0-only

//! Volume path resolution relative to a pool root.
//!
//! Paths are kept as strings: a name counts as already resolved when it
//! starts with the pool root as a plain string prefix.

use crate::error::Result;

/// On-disk path of `name` inside the pool rooted at `root`.
///
/// Returns `name` unchanged if it already starts with `root`, otherwise
/// `root/name`. Only fails if the string cannot be allocated.
pub fn resolve_path(root: &str, name: &str) -> Result<String> {
    if name.starts_with(root) {
        let mut path = String::new();
        path.try_reserve_exact(name.len())?;
        path.push_str(name);
        return Ok(path);
    }

    child_path(root, name)
}

/// `root/name`, unconditionally.
pub(crate) fn child_path(root: &str, name: &str) -> Result<String> {
    let mut path = String::new();
    path.try_reserve_exact(root.len() + 1 + name.len())?;
    path.push_str(root);
    path.push('/');
    path.push_str(name);
    Ok(path)
}
