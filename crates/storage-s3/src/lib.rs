//! AWS SDK S3 implementation of the object-store backend.
//!
//! This crate provides the `ObjectStoreClient` implementation the mirror
//! uses in production: put-from-file uploads, prefix listing with full
//! continuation-token pagination, and bulk deletes.

mod client;

pub use client::S3StoreClient;
