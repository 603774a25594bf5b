//! AWS SDK S3 client implementation.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use artifact_mirror_storage::{ObjectInfo, ObjectStoreClient, StorageError, StoreSettings};

/// S3 caps one DeleteObjects request at 1000 keys.
const DELETE_BATCH_SIZE: usize = 1000;

/// `ObjectStoreClient` implementation using the AWS SDK for Rust.
pub struct S3StoreClient {
    /// The underlying S3 client.
    s3_client: S3Client,
}

impl S3StoreClient {
    /// Create a new client with the resolved static credentials.
    ///
    /// # Arguments
    /// * `settings` - Region and credentials for the store
    ///
    /// # Returns
    /// A new S3 store client.
    pub async fn new(settings: StoreSettings) -> Self {
        let credentials: Credentials = Credentials::new(
            &settings.credentials.access_key_id,
            &settings.credentials.secret_access_key,
            settings.credentials.session_token.clone(),
            None,
            "artifact-mirror",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            s3_client: S3Client::new(&sdk_config),
        }
    }

    /// Create a client from an existing S3Client (for testing).
    pub fn from_client(s3_client: S3Client) -> Self {
        Self { s3_client }
    }
}

#[async_trait]
impl ObjectStoreClient for S3StoreClient {
    async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), StorageError> {
        let body: ByteStream = ByteStream::from_path(local_path).await.map_err(|err| {
            StorageError::Io {
                path: local_path.display().to_string(),
                message: err.to_string(),
            }
        })?;

        debug!("s3 put s3://{}/{}", bucket, key);
        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|err| StorageError::Network {
                message: err.to_string(),
            })?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects: Vec<ObjectInfo> = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .s3_client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix);

            if let Some(ref token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|err| StorageError::Network {
                message: err.to_string(),
            })?;

            if let Some(ref contents) = response.contents {
                for obj in contents {
                    let last_modified: i64 = obj
                        .last_modified()
                        .and_then(|dt| dt.to_millis().ok())
                        .unwrap_or(0);

                    objects.push(ObjectInfo {
                        key: obj.key().unwrap_or_default().to_string(),
                        size: obj.size().map(|s| s as u64).unwrap_or(0),
                        last_modified,
                    });
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token.clone();
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            let mut identifiers: Vec<ObjectIdentifier> = Vec::with_capacity(batch.len());
            for key in batch {
                let identifier: ObjectIdentifier = ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|err| StorageError::Network {
                        message: err.to_string(),
                    })?;
                identifiers.push(identifier);
            }
            let delete: Delete = Delete::builder()
                .set_objects(Some(identifiers))
                .build()
                .map_err(|err| StorageError::Network {
                    message: err.to_string(),
                })?;

            debug!("s3 delete {} keys from {}", batch.len(), bucket);
            self.s3_client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|err| StorageError::Network {
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_store_client_implements_trait() {
        // Compile-time check that the trait is implemented correctly.
        fn assert_store_client<T: ObjectStoreClient>() {}
        assert_store_client::<S3StoreClient>();
    }
}
