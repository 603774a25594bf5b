//! Shared configuration and location types for storage operations.

/// Identity of one build whose artifacts are mirrored.
///
/// The storage key for a build is a deterministic path derived from this
/// identity, so archive, delete and listing all agree on location without
/// an external registry. Concurrent operations on the same location are not
/// coordinated; the last writer to each backend wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Project (job) name.
    pub project: String,
    /// Build number within the project.
    pub number: u32,
}

impl ArtifactLocation {
    /// Create a new build location.
    pub fn new(project: impl Into<String>, number: u32) -> Self {
        Self {
            project: project.into(),
            number,
        }
    }

    /// Deterministic base path under a root: `{root}/{project}/{number}`.
    pub fn base_path(&self, root: &str) -> String {
        let root = root.trim_end_matches('/');
        if root.is_empty() {
            format!("{}/{}", self.project, self.number)
        } else {
            format!("{}/{}/{}", root, self.project, self.number)
        }
    }
}

/// Object-store backend target: bucket plus the key prefix builds live under.
#[derive(Debug, Clone)]
pub struct StoreTarget {
    /// Bucket name.
    pub bucket: String,
    /// Key prefix for all mirrored builds (e.g. "jenkins-artifacts").
    pub root_prefix: String,
}

impl StoreTarget {
    /// Base key prefix for one build.
    pub fn prefix_for(&self, location: &ArtifactLocation) -> String {
        location.base_path(&self.root_prefix)
    }
}

/// Remote-share backend target: host plus the absolute artifact root path.
#[derive(Debug, Clone)]
pub struct ShareTarget {
    /// Share host name.
    pub host: String,
    /// Absolute path of the artifact root on the share.
    pub root_path: String,
}

impl ShareTarget {
    /// Base directory for one build on the share.
    pub fn base_for(&self, location: &ArtifactLocation) -> String {
        location.base_path(&self.root_path)
    }
}

/// Object-store client settings.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Store region.
    pub region: String,
    /// Resolved credentials. There is no anonymous fallback; callers must
    /// resolve credentials before constructing a client.
    pub credentials: StoreCredentials,
}

/// Static object-store credentials.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Remote-share credentials.
#[derive(Debug, Clone)]
pub struct ShareCredentials {
    /// Login user on the share host.
    pub username: String,
    /// Authentication material.
    pub auth: ShareAuth,
}

/// Authentication material for the share session.
#[derive(Debug, Clone)]
pub enum ShareAuth {
    /// Password authentication.
    Password(String),
    /// PEM-encoded private key.
    PrivateKey(String),
}
