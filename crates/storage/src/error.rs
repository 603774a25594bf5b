//! Error types for mirror storage operations.

use thiserror::Error;

use artifact_mirror_common::PathError;

/// Errors that can occur while archiving, deleting or listing artifacts.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No credentials registered under the requested id.
    #[error("credentials not found: {id}")]
    CredentialsNotFound { id: String },

    /// The share host's key matched no known-hosts entry.
    #[error("host key rejected for {host}")]
    HostKeyRejected { host: String },

    /// The share refused the configured credentials.
    #[error("authentication failed for host={host} user={user}")]
    AuthenticationFailed { host: String, user: String },

    /// A remote command exited non-zero; carries the captured output.
    #[error("{host}: `{command}`: {output}")]
    RemoteCommand {
        host: String,
        command: String,
        output: String,
    },

    /// Protocol-level failure on the share session.
    #[error("ssh error on {host}: {message}")]
    Ssh { host: String, message: String },

    /// Object-store request failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    Io { path: String, message: String },

    /// A destination-relative path in the archive request was unusable.
    #[error("invalid destination: {source}")]
    InvalidDestination {
        #[from]
        source: PathError,
    },
}

impl StorageError {
    /// Create an Io error from std::io::Error.
    ///
    /// # Arguments
    /// * `path` - Path where the error occurred
    /// * `err` - The underlying IO error
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
