//! Dual-backend replication of build artifacts.
//!
//! `Replicator` copies a build's files to the object store and to the
//! remote share, then re-lists the object store under the build's base
//! prefix. The listing, not a local record of the uploads, is the
//! authoritative result: it reflects backend truth after any partial
//! uploads or backend-side transforms.
//!
//! The two backends carry an asymmetric failure policy. On archive, a
//! failure on either backend aborts the operation (nothing already uploaded
//! is rolled back). On delete, the share side is best-effort: its error is
//! held until the object-store delete has run, then re-raised, so store
//! cleanup is never blocked by a share problem.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use artifact_mirror_common::{join_key, normalize_destination, posix_file_name, posix_parent};

use crate::error::StorageError;
use crate::traits::{ExecOutput, ObjectInfo, ObjectStoreClient, ShareConnector, ShareSession};
use crate::types::{ArtifactLocation, ShareTarget, StoreTarget};

/// POSIX permission bits applied to files uploaded to the share.
const SHARE_FILE_MODE: i32 = 0o644;

/// Copies a build's files to both backends and lists the result.
pub struct Replicator {
    store: Arc<dyn ObjectStoreClient>,
    share: Arc<dyn ShareConnector>,
    store_target: StoreTarget,
    share_target: ShareTarget,
}

impl Replicator {
    /// Create a replicator over the two backends.
    pub fn new(
        store: Arc<dyn ObjectStoreClient>,
        share: Arc<dyn ShareConnector>,
        store_target: StoreTarget,
        share_target: ShareTarget,
    ) -> Self {
        Self {
            store,
            share,
            store_target,
            share_target,
        }
    }

    /// Base key prefix for one build in the object store.
    pub fn store_prefix(&self, location: &ArtifactLocation) -> String {
        self.store_target.prefix_for(location)
    }

    /// Copy `files` (destination-relative path to local file) to both
    /// backends, then return the authoritative object-store listing.
    ///
    /// Ordering matters for failure semantics: the object store is written
    /// first, the share second, and the listing runs only after both
    /// uploads have completed.
    ///
    /// # Errors
    /// A failure on either backend aborts the archive.
    pub async fn archive(
        &self,
        location: &ArtifactLocation,
        files: &BTreeMap<String, PathBuf>,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        info!(
            "publishing {} artifacts for {}/{}",
            files.len(),
            location.project,
            location.number
        );
        self.upload_to_store(location, files).await?;
        self.upload_to_share(location, files).await?;
        let objects: Vec<ObjectInfo> = self.list_store(location).await?;
        info!(
            "published {}/{}: {} objects in store",
            location.project,
            location.number,
            objects.len()
        );
        Ok(objects)
    }

    /// Delete the build's artifacts from both backends.
    ///
    /// The share delete runs first and is best-effort; the object-store
    /// delete runs unconditionally afterwards. A recorded share error is
    /// re-raised once the store delete has completed.
    pub async fn delete(&self, location: &ArtifactLocation) -> Result<(), StorageError> {
        let share_result: Result<(), StorageError> = self.delete_from_share(location).await;
        if let Err(ref e) = share_result {
            warn!(
                "share delete failed for {}/{}, continuing with store delete: {}",
                location.project, location.number, e
            );
        }
        self.delete_from_store(location).await?;
        share_result
    }

    /// Authoritative listing of the build's objects in the store.
    pub async fn list_store(
        &self,
        location: &ArtifactLocation,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        self.store
            .list_objects(&self.store_target.bucket, &self.store_prefix(location))
            .await
    }

    async fn upload_to_store(
        &self,
        location: &ArtifactLocation,
        files: &BTreeMap<String, PathBuf>,
    ) -> Result<(), StorageError> {
        let base: String = self.store_target.prefix_for(location);
        info!("uploading to bucket {}", self.store_target.bucket);
        for (destination, local) in files {
            let destination: String = normalize_destination(destination)?;
            let key: String = join_key(&base, &destination);
            debug!("store: {} -> {}", local.display(), key);
            self.store
                .put_object_from_file(&self.store_target.bucket, &key, local)
                .await?;
        }
        Ok(())
    }

    async fn upload_to_share(
        &self,
        location: &ArtifactLocation,
        files: &BTreeMap<String, PathBuf>,
    ) -> Result<(), StorageError> {
        let base: String = self.share_target.base_for(location);
        info!("uploading to {}", self.share_target.host);
        let mut session: Box<dyn ShareSession> = self.share.connect().await?;
        let result: Result<(), StorageError> =
            self.upload_files_over(session.as_mut(), &base, files).await;
        let closed: Result<(), StorageError> = session.close().await;
        result?;
        closed
    }

    async fn upload_files_over(
        &self,
        session: &mut dyn ShareSession,
        base: &str,
        files: &BTreeMap<String, PathBuf>,
    ) -> Result<(), StorageError> {
        for (destination, local) in files {
            let destination: String = normalize_destination(destination)?;
            let dir: String = match posix_parent(&destination) {
                Some(parent) => join_key(base, parent),
                None => base.to_string(),
            };
            let name: &str = posix_file_name(&destination);
            debug!("scp: {} -> {}/{}", local.display(), dir, name);

            // The share does not auto-create parent directories.
            let mkdir: String = format!("mkdir -p {}", dir);
            let out: ExecOutput = session.exec(&mkdir).await?;
            if !out.success() {
                return Err(StorageError::RemoteCommand {
                    host: self.share.host().to_string(),
                    command: mkdir,
                    output: out.output,
                });
            }
            session.upload(local, &dir, name, SHARE_FILE_MODE).await?;
        }
        Ok(())
    }

    async fn delete_from_share(&self, location: &ArtifactLocation) -> Result<(), StorageError> {
        let base: String = self.share_target.base_for(location);
        let mut session: Box<dyn ShareSession> = self.share.connect().await?;
        let command: String = format!("rm -rf {}", base);
        let result: Result<ExecOutput, StorageError> = session.exec(&command).await;
        let closed: Result<(), StorageError> = session.close().await;
        let out: ExecOutput = result?;
        closed?;
        if !out.success() {
            return Err(StorageError::RemoteCommand {
                host: self.share.host().to_string(),
                command,
                output: out.output,
            });
        }
        Ok(())
    }

    async fn delete_from_store(&self, location: &ArtifactLocation) -> Result<(), StorageError> {
        let objects: Vec<ObjectInfo> = self.list_store(location).await?;
        if objects.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = objects.into_iter().map(|o| o.key).collect();
        self.store
            .delete_objects(&self.store_target.bucket, &keys)
            .await
    }
}
