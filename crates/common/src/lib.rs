//! Shared types and utilities for the artifact-mirror crates.
//!
//! This crate provides functionality used across the workspace:
//! - POSIX-style key path helpers
//! - Shared path error type

pub mod error;
pub mod path_utils;

pub use error::PathError;
pub use path_utils::{join_key, normalize_destination, posix_file_name, posix_parent};
