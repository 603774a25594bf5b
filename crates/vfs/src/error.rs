//! Error types for the virtual artifact view.

use thiserror::Error;

/// Errors that can occur when reading through the virtual view.
#[derive(Error, Debug)]
pub enum VfsError {
    /// Content was requested for a path that is not a file.
    #[error("not a file: {path}")]
    NotAFile { path: String },

    /// Transport failure while streaming content.
    #[error("transport error: {message}")]
    Transport { message: String },
}
