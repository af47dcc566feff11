//! Re-rooting paths between the staging and persistence trees.

use std::path::{Path, PathBuf};

use crate::error::{MirrorError, Result};

/// Return `to_root / relative(path, from_root)`.
///
/// Fails with [`MirrorError::PathNotUnderRoot`] when `path` does not descend from
/// `from_root`. The comparison is purely lexical; callers pass paths produced by
/// walking or watching `from_root`, so no canonicalization is done here.
pub fn map_path(path: &Path, from_root: &Path, to_root: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(from_root)
        .map_err(|_| MirrorError::PathNotUnderRoot {
            path: path.to_path_buf(),
            root: from_root.to_path_buf(),
        })?;

    if relative.as_os_str().is_empty() {
        Ok(to_root.to_path_buf())
    } else {
        Ok(to_root.join(relative))
    }
}

/// Element-wise [`map_path`], preserving order. Stops at the first failure.
pub fn map_many<P: AsRef<Path>>(paths: &[P], from_root: &Path, to_root: &Path) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|p| map_path(p.as_ref(), from_root, to_root))
        .collect()
}
