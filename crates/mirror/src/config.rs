//! Mirror deployment configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors loading the deployment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    /// Config file is not valid JSON or misses required fields.
    #[error("cannot parse config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Configuration for one mirror deployment.
///
/// Backend locations and credential ids are deployment-specific and
/// required; path roots and the share port default to the conventional
/// layout.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Object-store bucket holding mirrored artifacts.
    pub bucket: String,
    /// Object-store region.
    pub region: String,
    /// Key prefix under which builds are stored.
    #[serde(default = "default_store_root")]
    pub store_root: String,
    /// Remote-share host name.
    pub share_host: String,
    /// Remote-share port. Host keys are only trusted on the standard port.
    #[serde(default = "default_share_port")]
    pub share_port: u16,
    /// Absolute path of the artifact root on the share.
    #[serde(default = "default_share_root")]
    pub share_root: String,
    /// URL prefix artifact content is served from; must end with `/`.
    pub url_base: String,
    /// Credential id resolved to object-store credentials.
    pub store_credential_id: String,
    /// Credential id resolved to share credentials.
    pub share_credential_id: String,
    /// Directory holding per-build listing snapshots.
    pub cache_root: PathBuf,
    /// Projects whose builds are mirrored.
    pub allowed_projects: Vec<String>,
}

fn default_store_root() -> String {
    "jenkins-artifacts".to_string()
}

fn default_share_root() -> String {
    "/srv/samba/share/jenkins-artifacts".to_string()
}

fn default_share_port() -> u16 {
    22
}

impl MirrorConfig {
    /// Load the configuration from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data: Vec<u8> = fs::read(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&data).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let config: MirrorConfig = serde_json::from_str(
            r#"{
                "bucket": "share.example",
                "region": "us-east-1",
                "share_host": "raven.example.com",
                "url_base": "http://share.example.com/",
                "store_credential_id": "store-cred",
                "share_credential_id": "share-cred",
                "cache_root": "/var/lib/artifact-mirror",
                "allowed_projects": ["agent-copy-artifacts"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.store_root, "jenkins-artifacts");
        assert_eq!(config.share_root, "/srv/samba/share/jenkins-artifacts");
        assert_eq!(config.share_port, 22);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result: Result<MirrorConfig, _> = serde_json::from_str(r#"{"bucket": "b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err: ConfigError =
            MirrorConfig::from_file(Path::new("/does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
