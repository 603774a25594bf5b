//! Per-build snapshot of the authoritative object listing.
//!
//! Browsing a build's artifacts rebuilds the virtual view from the last
//! listing; persisting that listing avoids a backend listing call on every
//! root access. The snapshot is written after a successful archive, removed
//! on delete, and read everywhere else.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::error::StorageError;
use crate::traits::ObjectInfo;
use crate::types::ArtifactLocation;

/// File name of the snapshot inside a build's cache directory.
const SNAPSHOT_FILE: &str = "objects.json";

/// Stores the last-known object listing per build.
pub struct ListingCache {
    root: PathBuf,
}

impl ListingCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the snapshot file for one build.
    fn snapshot_path(&self, location: &ArtifactLocation) -> PathBuf {
        self.root
            .join(&location.project)
            .join(location.number.to_string())
            .join(SNAPSHOT_FILE)
    }

    /// Persist the listing, overwriting any prior snapshot.
    ///
    /// # Errors
    /// Returns error if the snapshot cannot be serialized or written.
    pub fn save(
        &self,
        location: &ArtifactLocation,
        objects: &[ObjectInfo],
    ) -> Result<(), StorageError> {
        let path: PathBuf = self.snapshot_path(location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(parent.display().to_string(), e))?;
        }
        let data: Vec<u8> = serde_json::to_vec(objects).map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&path, data).map_err(|e| StorageError::from_io(path.display().to_string(), e))
    }

    /// Load the snapshot for one build.
    ///
    /// A missing file and a corrupt file are both a cache miss, not an
    /// error: the caller can always rebuild the listing from the backend.
    /// Corruption is logged and the snapshot ignored.
    pub fn load(&self, location: &ArtifactLocation) -> Option<Vec<ObjectInfo>> {
        let path: PathBuf = self.snapshot_path(location);
        let data: Vec<u8> = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read listing snapshot {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(objects) => Some(objects),
            Err(e) => {
                warn!("discarding corrupt listing snapshot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Remove the snapshot for one build, tolerating its absence.
    pub fn invalidate(&self, location: &ArtifactLocation) -> Result<(), StorageError> {
        let path: PathBuf = self.snapshot_path(location);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(path.display().to_string(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_objects() -> Vec<ObjectInfo> {
        vec![
            ObjectInfo {
                key: "jenkins-artifacts/p1/5/out.txt".to_string(),
                size: 11,
                last_modified: 1_700_000_000_000,
            },
            ObjectInfo {
                key: "jenkins-artifacts/p1/5/logs/build.log".to_string(),
                size: 4096,
                last_modified: 1_700_000_001_000,
            },
        ]
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());
        let location: ArtifactLocation = ArtifactLocation::new("p1", 5);

        cache.save(&location, &sample_objects()).unwrap();
        let loaded: Vec<ObjectInfo> = cache.load(&location).unwrap();
        assert_eq!(loaded, sample_objects());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());

        assert!(cache.load(&ArtifactLocation::new("p1", 5)).is_none());
    }

    #[test]
    fn test_load_corrupt_is_none() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());
        let location: ArtifactLocation = ArtifactLocation::new("p1", 5);

        cache.save(&location, &sample_objects()).unwrap();
        let path = dir.path().join("p1").join("5").join("objects.json");
        std::fs::write(&path, b"not json{").unwrap();

        assert!(cache.load(&location).is_none());
    }

    #[test]
    fn test_save_overwrites_prior_snapshot() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());
        let location: ArtifactLocation = ArtifactLocation::new("p1", 5);

        cache.save(&location, &sample_objects()).unwrap();
        let replacement: Vec<ObjectInfo> = vec![ObjectInfo {
            key: "jenkins-artifacts/p1/5/other.txt".to_string(),
            size: 1,
            last_modified: 0,
        }];
        cache.save(&location, &replacement).unwrap();

        assert_eq!(cache.load(&location).unwrap(), replacement);
    }

    #[test]
    fn test_invalidate_then_load_is_none() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());
        let location: ArtifactLocation = ArtifactLocation::new("p1", 5);

        cache.save(&location, &sample_objects()).unwrap();
        cache.invalidate(&location).unwrap();
        assert!(cache.load(&location).is_none());
    }

    #[test]
    fn test_invalidate_missing_is_ok() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());

        cache.invalidate(&ArtifactLocation::new("p9", 1)).unwrap();
    }

    #[test]
    fn test_builds_do_not_collide() {
        let dir: TempDir = TempDir::new().unwrap();
        let cache: ListingCache = ListingCache::new(dir.path());
        let five: ArtifactLocation = ArtifactLocation::new("p1", 5);
        let six: ArtifactLocation = ArtifactLocation::new("p1", 6);

        cache.save(&five, &sample_objects()).unwrap();
        assert!(cache.load(&six).is_none());
        cache.invalidate(&six).unwrap();
        assert!(cache.load(&five).is_some());
    }
}
