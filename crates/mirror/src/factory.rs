//! Construction gate deciding which builds are mirrored.

use std::sync::Arc;

use artifact_mirror_share_ssh::SshShareConnector;
use artifact_mirror_storage::{
    CredentialResolver, ShareCredentials, ShareTarget, StorageError, StoreCredentials,
    StoreSettings, StoreTarget,
};
use artifact_mirror_storage_s3::S3StoreClient;

use crate::config::MirrorConfig;
use crate::manager::ArtifactMirror;

/// Builds an [`ArtifactMirror`] for builds of allowed projects.
pub struct MirrorFactory {
    config: MirrorConfig,
}

impl MirrorFactory {
    /// Create a factory for one deployment configuration.
    pub fn new(config: MirrorConfig) -> Self {
        Self { config }
    }

    /// A mirror for the project's builds, or `None` when the project is
    /// not mirrored.
    ///
    /// Credentials are resolved here, before any network call; an unknown
    /// credential id is a hard error, not a fallback to anonymous access.
    pub async fn mirror_for(
        &self,
        resolver: &dyn CredentialResolver,
        project: &str,
    ) -> Result<Option<ArtifactMirror>, StorageError> {
        if !self.config.allowed_projects.iter().any(|p| p == project) {
            return Ok(None);
        }

        let store_credentials: StoreCredentials =
            resolver.store_credentials(&self.config.store_credential_id)?;
        let share_credentials: ShareCredentials =
            resolver.share_credentials(&self.config.share_credential_id)?;

        let store: S3StoreClient = S3StoreClient::new(StoreSettings {
            region: self.config.region.clone(),
            credentials: store_credentials,
        })
        .await;
        let share: SshShareConnector = SshShareConnector::new(
            self.config.share_host.clone(),
            self.config.share_port,
            share_credentials,
        );

        Ok(Some(ArtifactMirror::new(
            Arc::new(store),
            Arc::new(share),
            StoreTarget {
                bucket: self.config.bucket.clone(),
                root_prefix: self.config.store_root.clone(),
            },
            ShareTarget {
                host: self.config.share_host.clone(),
                root_path: self.config.share_root.clone(),
            },
            self.config.cache_root.clone(),
            self.config.url_base.clone(),
        )))
    }
}
