//! Storage core for the artifact mirror.
//!
//! This crate defines the backend-neutral pieces of the mirror: the object
//! descriptor and the traits the object-store and remote-share clients
//! implement, the `Replicator` that copies a build's files to both backends
//! and produces the authoritative listing, and the `ListingCache` that
//! persists that listing per build so repeated browsing does not re-query
//! the backend.
//!
//! Backend implementations live in their own crates (`storage-s3`,
//! `share-ssh`); everything here is written against the traits so the
//! orchestration can be exercised with in-memory backends.

mod error;
mod listing_cache;
mod replicate;
mod traits;
mod types;

pub use error::StorageError;
pub use listing_cache::ListingCache;
pub use replicate::Replicator;
pub use traits::{
    CredentialResolver, ExecOutput, ObjectInfo, ObjectStoreClient, ShareConnector, ShareSession,
};
pub use types::{
    ArtifactLocation, ShareAuth, ShareCredentials, ShareTarget, StoreCredentials, StoreSettings,
    StoreTarget,
};
