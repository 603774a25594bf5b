//! Virtual filesystem over a build's mirrored artifacts.
//!
//! The view is built from a flat object listing, never from a materialized
//! tree: `ObjectIndex` orders every listed key by path segments, and
//! `ArtifactFile` answers filesystem-shaped questions (file or directory,
//! children, content) as cheap queries against that shared index. Parent
//! and child nodes are derived by path arithmetic alone, so a node never
//! holds a back-reference and traversal never calls a backend.

mod error;
mod index;
mod node;

pub use error::VfsError;
pub use index::{KeyPath, ObjectIndex};
pub use node::ArtifactFile;
