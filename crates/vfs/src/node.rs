//! Lazily-derived virtual view over an object index.

use std::pin::Pin;
use std::sync::Arc;

use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::error::VfsError;
use crate::index::{KeyPath, ObjectIndex};

/// One path-scoped view over a build's mirrored artifacts.
///
/// A node is a cheap (index, path) pair. Exactly one of three states holds
/// for any path: an exact key in the index is a *file*, a strict prefix of
/// some key is a *directory*, anything else is absent. The directory check
/// short-circuits on a file match, so a path can never be both.
#[derive(Clone)]
pub struct ArtifactFile {
    index: Arc<ObjectIndex>,
    url_base: String,
    path: KeyPath,
}

impl ArtifactFile {
    /// Root node for a build at its base path.
    ///
    /// # Arguments
    /// * `index` - Shared index over the build's listing
    /// * `url_base` - URL prefix content is served from; must end with `/`
    /// * `base` - The build's base path inside the index keys
    pub fn root(index: Arc<ObjectIndex>, url_base: impl Into<String>, base: KeyPath) -> Self {
        Self {
            index,
            url_base: url_base.into(),
            path: base,
        }
    }

    fn at(&self, path: KeyPath) -> Self {
        Self {
            index: Arc::clone(&self.index),
            url_base: self.url_base.clone(),
            path,
        }
    }

    /// Final path segment.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Path of this node inside the index keys.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Parent node, derived structurally; `None` above the key root.
    pub fn parent(&self) -> Option<ArtifactFile> {
        self.path.parent().map(|parent| self.at(parent))
    }

    /// Child node by name.
    ///
    /// Always succeeds structurally; existence is checked lazily through
    /// `exists`/`is_file`.
    pub fn child(&self, name: &str) -> ArtifactFile {
        self.at(self.path.join(name))
    }

    /// True iff the path is an exact key in the index.
    pub fn is_file(&self) -> bool {
        self.index.lookup(&self.path).is_some()
    }

    /// True iff the path is a strict prefix of some key but not a key.
    pub fn is_directory(&self) -> bool {
        !self.is_file() && self.index.has_descendant(&self.path)
    }

    /// True iff the path is a file or a directory.
    pub fn exists(&self) -> bool {
        self.is_file() || self.is_directory()
    }

    /// Size in bytes; 0 when the node is not a file.
    pub fn len(&self) -> u64 {
        self.index.lookup(&self.path).map(|o| o.size).unwrap_or(0)
    }

    /// True iff `len()` is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Modification time in milliseconds since the epoch; 0 when the node
    /// is not a file.
    pub fn last_modified(&self) -> i64 {
        self.index
            .lookup(&self.path)
            .map(|o| o.last_modified)
            .unwrap_or(0)
    }

    /// Immediate children, each bound to the same index snapshot.
    ///
    /// Empty for files and absent paths; stable order; no duplicates even
    /// when several keys share an immediate child segment.
    pub fn list(&self) -> Vec<ArtifactFile> {
        if !self.is_directory() {
            return Vec::new();
        }
        self.index
            .children(&self.path)
            .into_iter()
            .map(|name| self.child(&name))
            .collect()
    }

    /// Externally-resolvable location of a file's content.
    ///
    /// `None` for directories and absent paths. The location is the same
    /// one `open` streams from, so viewers can link straight to backend
    /// storage instead of proxying bytes through the mirror.
    pub fn external_url(&self) -> Option<String> {
        if !self.is_file() {
            return None;
        }
        Some(format!("{}{}", self.url_base, self.path))
    }

    /// Stream the file's content from backend storage.
    ///
    /// Bytes come straight from the transport; there is no retry and no
    /// local buffering.
    ///
    /// # Errors
    /// `NotAFile` on directories and absent paths; `Transport` when the
    /// backend refuses the request.
    pub async fn open(&self) -> Result<Pin<Box<dyn AsyncRead + Send>>, VfsError> {
        let url: String = self.external_url().ok_or_else(|| VfsError::NotAFile {
            path: self.path.to_string(),
        })?;
        let response = reqwest::get(&url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| VfsError::Transport {
                message: err.to_string(),
            })?;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}
