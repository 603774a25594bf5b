//! Backend traits implemented by the object-store and remote-share clients.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::types::{ShareCredentials, StoreCredentials};

/// Information about one stored object, as reported by a listing call.
///
/// A descriptor is a snapshot fact about backend state at listing time; it
/// is never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full backend key of the object.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (milliseconds since Unix epoch).
    pub last_modified: i64,
}

/// Object-store operations the mirror depends on.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Upload a local file to the store.
    async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), StorageError>;

    /// List every object under a prefix.
    ///
    /// Implementations page through the backend's continuation cursor until
    /// it is exhausted; there is no page-count cap.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Bulk-delete objects by key.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError>;
}

/// Captured result of a remote command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Remote exit status.
    pub exit_status: i32,
    /// Combined captured output, kept for diagnosis on failure.
    pub output: String,
}

impl ExecOutput {
    /// True iff the command exited zero.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// An authenticated session against the remote share.
///
/// Sessions are scoped resources: whatever happens during use, `close` must
/// run on every exit path before the session is dropped.
#[async_trait]
pub trait ShareSession: Send {
    /// Run a command on the share host, capturing output and exit status.
    async fn exec(&mut self, command: &str) -> Result<ExecOutput, StorageError>;

    /// Upload a local file into a remote directory with the given POSIX
    /// permission bits. The directory must already exist.
    async fn upload(
        &mut self,
        local_path: &Path,
        remote_dir: &str,
        file_name: &str,
        mode: i32,
    ) -> Result<(), StorageError>;

    /// Close the session, releasing the connection.
    async fn close(&mut self) -> Result<(), StorageError>;
}

/// Opens authenticated sessions against the remote share.
#[async_trait]
pub trait ShareConnector: Send + Sync {
    /// Share host name, for error reporting.
    fn host(&self) -> &str;

    /// Connect, verify the host key and authenticate.
    ///
    /// Trust or authentication failures are hard errors; there is no
    /// anonymous fallback.
    async fn connect(&self) -> Result<Box<dyn ShareSession>, StorageError>;
}

/// Resolves named credential identifiers to backend credentials.
pub trait CredentialResolver: Send + Sync {
    /// Object-store credentials for a credential id.
    ///
    /// # Errors
    /// `StorageError::CredentialsNotFound` when the id is unknown.
    fn store_credentials(&self, id: &str) -> Result<StoreCredentials, StorageError>;

    /// Remote-share credentials for a credential id.
    ///
    /// # Errors
    /// `StorageError::CredentialsNotFound` when the id is unknown.
    fn share_credentials(&self, id: &str) -> Result<ShareCredentials, StorageError>;
}
