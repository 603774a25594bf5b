//! Mirrors CI build artifacts into two durable backends and serves them
//! back through a virtual filesystem view.
//!
//! An archive request copies a build's output files to an object-store
//! bucket and to a remote file share, then persists the authoritative
//! object listing. Later root-access requests rebuild a path-ordered index
//! from that listing (re-listing the store only on a cache miss) and hand
//! out an `ArtifactFile` rooted at the build's base path.
//!
//! The [`MirrorFactory`] decides which builds are mirrored and wires the
//! production backends together; [`ArtifactMirror`] is the per-deployment
//! orchestrator.

mod config;
mod factory;
mod manager;

pub use config::{ConfigError, MirrorConfig};
pub use factory::MirrorFactory;
pub use manager::ArtifactMirror;
