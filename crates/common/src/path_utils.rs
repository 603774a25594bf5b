//! POSIX-style key path helpers.
//!
//! Backend keys and share paths always use `/` separators regardless of the
//! host platform, so these helpers work on strings, not `std::path`.

use crate::error::PathError;

/// Join a base key and a relative path with a single separator.
///
/// # Arguments
/// * `base` - Base key, possibly empty
/// * `rel` - Relative path, possibly empty
///
/// # Returns
/// The joined key without doubled or trailing separators.
pub fn join_key(base: &str, rel: &str) -> String {
    let base = base.trim_end_matches('/');
    let rel = rel.trim_start_matches('/');
    if base.is_empty() {
        rel.to_string()
    } else if rel.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, rel)
    }
}

/// Parent portion of a key, `None` for single-segment keys.
pub fn posix_parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Final segment of a key.
pub fn posix_file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Validate and normalize a destination-relative path.
///
/// Destinations come from the archive request and end up concatenated onto
/// backend base paths, so they must stay inside them: absolute paths and
/// `..` components are rejected, `.` and empty segments are dropped.
///
/// # Arguments
/// * `path` - Destination-relative path from the archive request
///
/// # Returns
/// The normalized relative path.
///
/// # Errors
/// Returns error if the path is absolute, empty, or escapes its base.
pub fn normalize_destination(path: &str) -> Result<String, PathError> {
    if path.starts_with('/') {
        return Err(PathError::InvalidPath { path: path.to_string() });
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(PathError::EscapesBase { path: path.to_string() });
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(PathError::InvalidPath { path: path.to_string() });
    }
    Ok(segments.join("/"))
}
