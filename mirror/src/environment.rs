//! Building and tearing down the staging tree.

use std::fs;
use std::path::{Path, PathBuf};

use autopdf_utils_trash::{Recycler, TrashError};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{MirrorError, Result};
use crate::path_map::map_many;

/// Zero-byte sentinel written once the skeleton is complete.
pub const MARKER_FILE_NAME: &str = ".autopdf_env";

/// How [`MirrorEnvironment::create`] got to a valid mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStatus {
    /// The staging root was empty or missing.
    Created,
    /// A previous mirror was discarded and rebuilt.
    Resynced,
}

/// What happened to the staging root on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// Moved to the trash.
    Trashed,
    /// The platform refused; the user has to remove it.
    LeftInPlace,
    /// Nothing was there.
    Missing,
}

/// A persistence root paired with the staging root that mirrors it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEnvironment {
    persistence_root: PathBuf,
    staging_root: PathBuf,
    marker_present: bool,
}

impl MirrorEnvironment {
    /// Describe an environment without touching the disk beyond the marker check.
    pub fn new(persistence_root: impl Into<PathBuf>, staging_root: impl Into<PathBuf>) -> Self {
        let staging_root = staging_root.into();
        let marker_present = staging_root.join(MARKER_FILE_NAME).is_file();

        Self {
            persistence_root: persistence_root.into(),
            staging_root,
            marker_present,
        }
    }

    /// Build (or rebuild) the staging skeleton for `persistence_root`.
    ///
    /// - a staging root that is a regular file is refused with
    ///   [`MirrorError::InvalidMirrorTarget`];
    /// - one carrying the marker is recycled first and rebuilt (resync);
    /// - a non-empty one without the marker is refused with
    ///   [`MirrorError::DirtyMirrorTarget`] so unrelated data is never touched.
    pub fn create(
        persistence_root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
        recycler: &dyn Recycler,
    ) -> Result<(Self, MirrorStatus)> {
        let mut env = Self::new(persistence_root, staging_root);
        info!("Creating mirror of {} in {}", env.persistence_root.display(), env.staging_root.display());

        if !env.persistence_root.is_dir() {
            return Err(MirrorError::PersistenceRootNotFound(env.persistence_root.clone()));
        }
        env.check_not_nested()?;

        let mut status = MirrorStatus::Created;
        if env.staging_root.exists() {
            if !env.staging_root.is_dir() {
                return Err(MirrorError::InvalidMirrorTarget(env.staging_root.clone()));
            }

            if env.marker_present {
                info!("Found existing mirror, resyncing");
                status = MirrorStatus::Resynced;
                if destroy(&env.staging_root, true, recycler)? == DestroyOutcome::LeftInPlace {
                    warn!("Previous mirror could not be removed; rebuilding on top of it");
                }
                env.marker_present = false;
            } else if fs::read_dir(&env.staging_root)?.next().is_some() {
                return Err(MirrorError::DirtyMirrorTarget(env.staging_root.clone()));
            }
        }

        let directories = skeleton(&env.persistence_root)?;
        let mirrored = map_many(&directories, &env.persistence_root, &env.staging_root)?;

        fs::create_dir_all(&env.staging_root)?;
        for dir in &mirrored {
            fs::create_dir_all(dir)?;
        }
        debug!("Replicated {} directories", mirrored.len());

        fs::File::create(env.marker_path())?;
        env.marker_present = true;

        match status {
            MirrorStatus::Created => info!("Created mirror: {}", env.staging_root.display()),
            MirrorStatus::Resynced => info!("Resynced mirror: {}", env.staging_root.display()),
        }
        Ok((env, status))
    }

    /// Recycle the staging root of this environment.
    pub fn destroy(&mut self, recycler: &dyn Recycler) -> Result<DestroyOutcome> {
        let outcome = destroy(&self.staging_root, false, recycler)?;
        if outcome != DestroyOutcome::LeftInPlace {
            self.marker_present = false;
        }
        Ok(outcome)
    }

    /// Root of the user's document tree.
    pub fn persistence_root(&self) -> &Path {
        &self.persistence_root
    }

    /// Root of the staging tree.
    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Location of the marker file.
    pub fn marker_path(&self) -> PathBuf {
        self.staging_root.join(MARKER_FILE_NAME)
    }

    /// Whether the mirror is known to be complete.
    pub fn marker_present(&self) -> bool {
        self.marker_present
    }

    fn check_not_nested(&self) -> Result<()> {
        let staging = std::path::absolute(&self.staging_root)?;
        let persistence = std::path::absolute(&self.persistence_root)?;

        if staging.starts_with(&persistence) || persistence.starts_with(&staging) {
            return Err(MirrorError::NestedMirrorTarget {
                staging,
                persistence,
            });
        }
        Ok(())
    }
}

/// Move `staging_root` to the trash.
///
/// A permission failure is logged and reported as [`DestroyOutcome::LeftInPlace`];
/// it is never fatal.
pub fn destroy(staging_root: &Path, is_resync: bool, recycler: &dyn Recycler) -> Result<DestroyOutcome> {
    if !is_resync {
        info!("Removing mirror {}", staging_root.display());
    }

    match recycler.recycle(staging_root) {
        Ok(()) => Ok(DestroyOutcome::Trashed),
        Err(TrashError::NotFound(_)) => Ok(DestroyOutcome::Missing),
        Err(e) if e.is_permission_denied() => {
            warn!(
                "Could not remove staging root {}: {e}. Please remove it yourself",
                staging_root.display()
            );
            Ok(DestroyOutcome::LeftInPlace)
        }
        Err(e) => {
            warn!("Could not remove staging root {}: {e}", staging_root.display());
            Ok(DestroyOutcome::LeftInPlace)
        }
    }
}

/// Every directory below `root` (excluding `root`), deepest first.
pub fn skeleton(root: &Path) -> Result<Vec<PathBuf>> {
    let mut directories = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            directories.push(entry.into_path());
        }
    }

    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopdf_utils_trash::RemoveRecycler;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct DenyingRecycler;

    impl Recycler for DenyingRecycler {
        fn recycle(&self, path: &Path) -> autopdf_utils_trash::Result<()> {
            Err(TrashError::PermissionDenied(path.to_path_buf()))
        }
    }

    fn persistence_fixture(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("documents");
        fs::create_dir_all(root.join("docs/drafts")).unwrap();
        fs::create_dir_all(root.join("invoices/2024")).unwrap();
        fs::write(root.join("docs/report.docx"), b"docx").unwrap();
        fs::write(root.join("invoices/2024/march.pdf"), b"pdf").unwrap();
        root
    }

    fn relative_tree(root: &Path) -> Vec<String> {
        let mut entries: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                if e.file_type().is_dir() { format!("{rel}/") } else { rel }
            })
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_create_replicates_directories_only() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");

        let (env, status) = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();

        assert_eq!(status, MirrorStatus::Created);
        assert!(env.marker_present());
        assert_eq!(
            relative_tree(&staging),
            vec![
                ".autopdf_env",
                "docs/",
                "docs/drafts/",
                "invoices/",
                "invoices/2024/",
            ]
        );
    }

    #[test]
    fn test_create_in_existing_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");
        fs::create_dir(&staging).unwrap();

        let (_, status) = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();
        assert_eq!(status, MirrorStatus::Created);
        assert!(staging.join(MARKER_FILE_NAME).is_file());
    }

    #[test]
    fn test_resync_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");

        MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();
        let first = relative_tree(&staging);

        // Leftovers from the previous run are discarded by the resync.
        fs::write(staging.join("docs/leftover.docx"), b"x").unwrap();

        let (_, status) = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();
        assert_eq!(status, MirrorStatus::Resynced);
        assert_eq!(relative_tree(&staging), first);
    }

    #[test]
    fn test_staging_file_is_invalid_target() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");
        fs::write(&staging, b"not a directory").unwrap();

        let err = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidMirrorTarget(_)));
    }

    #[test]
    fn test_dirty_staging_is_refused_and_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");
        fs::create_dir(&staging).unwrap();
        fs::write(staging.join("precious.txt"), b"keep me").unwrap();

        let err = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap_err();

        assert!(matches!(err, MirrorError::DirtyMirrorTarget(_)));
        assert_eq!(fs::read(staging.join("precious.txt")).unwrap(), b"keep me");
        assert!(!staging.join(MARKER_FILE_NAME).exists());
    }

    #[test]
    fn test_nested_roots_are_refused() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);

        let err = MirrorEnvironment::create(&persistence, persistence.join("docs/staging"), &RemoveRecycler)
            .unwrap_err();
        assert!(matches!(err, MirrorError::NestedMirrorTarget { .. }));

        let err = MirrorEnvironment::create(&persistence, temp_dir.path(), &RemoveRecycler).unwrap_err();
        assert!(matches!(err, MirrorError::NestedMirrorTarget { .. }));
    }

    #[test]
    fn test_missing_persistence_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = MirrorEnvironment::create(
            temp_dir.path().join("nope"),
            temp_dir.path().join("staging"),
            &RemoveRecycler,
        )
        .unwrap_err();

        assert!(matches!(err, MirrorError::PersistenceRootNotFound(_)));
    }

    #[test]
    fn test_create_then_destroy_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");

        let (mut env, _) = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();
        let outcome = env.destroy(&RemoveRecycler).unwrap();

        assert_eq!(outcome, DestroyOutcome::Trashed);
        assert!(!env.marker_present());
        assert!(!staging.exists());
        // The persistence tree is untouched.
        assert!(persistence.join("docs/report.docx").is_file());
    }

    #[test]
    fn test_destroy_permission_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);
        let staging = temp_dir.path().join("staging");

        let (mut env, _) = MirrorEnvironment::create(&persistence, &staging, &RemoveRecycler).unwrap();
        let outcome = env.destroy(&DenyingRecycler).unwrap();

        assert_eq!(outcome, DestroyOutcome::LeftInPlace);
        assert!(staging.join(MARKER_FILE_NAME).is_file());
        assert!(env.marker_present());
    }

    #[test]
    fn test_destroy_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = destroy(&temp_dir.path().join("gone"), false, &RemoveRecycler).unwrap();
        assert_eq!(outcome, DestroyOutcome::Missing);
    }

    #[test]
    fn test_skeleton_is_deepest_first() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence_fixture(&temp_dir);

        let dirs = skeleton(&persistence).unwrap();
        assert_eq!(dirs.len(), 4);

        for (i, dir) in dirs.iter().enumerate() {
            for later in &dirs[i + 1..] {
                assert!(!later.starts_with(dir) || later == dir, "{} listed before its descendant {}", dir.display(), later.display());
            }
        }
    }
}
