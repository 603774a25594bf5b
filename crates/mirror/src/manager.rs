//! Archive, delete and root-access orchestration for one deployment.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use artifact_mirror_storage::{
    ArtifactLocation, ListingCache, ObjectInfo, ObjectStoreClient, Replicator, ShareConnector,
    ShareTarget, StorageError, StoreTarget,
};
use artifact_mirror_vfs::{ArtifactFile, KeyPath, ObjectIndex};

/// Mirrors builds into both backends and serves the virtual view over them.
pub struct ArtifactMirror {
    replicator: Replicator,
    cache: ListingCache,
    url_base: String,
}

impl std::fmt::Debug for ArtifactMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactMirror")
            .field("url_base", &self.url_base)
            .finish_non_exhaustive()
    }
}

impl ArtifactMirror {
    /// Create a mirror over the given backends.
    ///
    /// # Arguments
    /// * `store` - Object-store client
    /// * `share` - Remote-share connector
    /// * `store_target` - Bucket and key prefix builds are stored under
    /// * `share_target` - Share host and artifact root path
    /// * `cache_root` - Directory for per-build listing snapshots
    /// * `url_base` - URL prefix artifact content is served from
    pub fn new(
        store: Arc<dyn ObjectStoreClient>,
        share: Arc<dyn ShareConnector>,
        store_target: StoreTarget,
        share_target: ShareTarget,
        cache_root: PathBuf,
        url_base: impl Into<String>,
    ) -> Self {
        Self {
            replicator: Replicator::new(store, share, store_target, share_target),
            cache: ListingCache::new(cache_root),
            url_base: url_base.into(),
        }
    }

    /// Mirror `files` (destination-relative path to local file) into both
    /// backends and persist the authoritative listing.
    ///
    /// The snapshot is written only after both uploads and the re-listing
    /// have completed, so a cached listing always reflects a finished
    /// archive.
    pub async fn archive(
        &self,
        location: &ArtifactLocation,
        files: &BTreeMap<String, PathBuf>,
    ) -> Result<(), StorageError> {
        let objects: Vec<ObjectInfo> = self.replicator.archive(location, files).await?;
        self.cache.save(location, &objects)
    }

    /// Remove the build from both backends and drop its cached listing.
    pub async fn delete(&self, location: &ArtifactLocation) -> Result<(), StorageError> {
        self.cache.invalidate(location)?;
        self.replicator.delete(location).await
    }

    /// Virtual root of the build's artifacts.
    ///
    /// Reads the cached listing, re-listing the object store when the
    /// snapshot is absent or unreadable. A build with no objects yields a
    /// root whose `exists()` is false; a missing build is never an error.
    pub async fn root(&self, location: &ArtifactLocation) -> Result<ArtifactFile, StorageError> {
        let objects: Vec<ObjectInfo> = match self.cache.load(location) {
            Some(objects) => objects,
            None => {
                debug!(
                    "no cached listing for {}/{}, listing store",
                    location.project, location.number
                );
                self.replicator.list_store(location).await?
            }
        };
        let index: ObjectIndex = ObjectIndex::build(objects);
        let base: KeyPath = KeyPath::parse(&self.replicator.store_prefix(location));
        Ok(ArtifactFile::root(
            Arc::new(index),
            self.url_base.clone(),
            base,
        ))
    }
}
