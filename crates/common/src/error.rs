//! Shared error types used across artifact-mirror crates.

use thiserror::Error;

/// Path-related errors shared across crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is absolute or empty where a relative destination is required.
    #[error("invalid destination path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: String,
    },

    /// Path climbs out of its base directory.
    #[error("destination escapes base: {path}")]
    EscapesBase {
        /// The escaping path.
        path: String,
    },
}
