//! Host-key verification against the local known-hosts files.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// The only port on which a share host is trusted.
pub const TRUSTED_PORT: u16 = 22;

/// System-wide known-hosts file.
const SYSTEM_KNOWN_HOSTS: &str = "/etc/ssh/ssh_known_hosts";

/// Verifies server host keys against `/etc/ssh/ssh_known_hosts` and
/// `~/.ssh/known_hosts`.
///
/// Entries load on first verification and stay fixed for the verifier's
/// lifetime, so one archive or delete operation reads the trust files at
/// most once. A host key is trusted iff the session uses the standard port
/// and hostname, key type and exact key bytes all match one entry.
pub struct KnownHostVerifier {
    files: Vec<PathBuf>,
    entries: OnceLock<Vec<KeyEntry>>,
}

impl KnownHostVerifier {
    /// Verifier over the standard system and per-user known-hosts files.
    pub fn new() -> Self {
        let mut files: Vec<PathBuf> = vec![PathBuf::from(SYSTEM_KNOWN_HOSTS)];
        if let Some(home) = std::env::var_os("HOME") {
            files.push(PathBuf::from(home).join(".ssh").join("known_hosts"));
        }
        Self::from_files(files)
    }

    /// Verifier over an explicit list of known-hosts files.
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            entries: OnceLock::new(),
        }
    }

    /// True iff the host key is trusted.
    ///
    /// # Arguments
    /// * `hostname` - Host the session connected to
    /// * `port` - Port the session connected to
    /// * `key_type` - Key algorithm name (e.g. "ecdsa-sha2-nistp256")
    /// * `key` - Raw server host key bytes
    pub fn verify(&self, hostname: &str, port: u16, key_type: &str, key: &[u8]) -> bool {
        if port != TRUSTED_PORT {
            return false;
        }
        self.entries()
            .iter()
            .any(|entry| entry.matches(hostname, key_type, key))
    }

    fn entries(&self) -> &[KeyEntry] {
        self.entries.get_or_init(|| {
            let mut entries: Vec<KeyEntry> = Vec::new();
            for file in &self.files {
                let Ok(contents) = fs::read_to_string(file) else {
                    continue;
                };
                entries.extend(contents.lines().filter_map(KeyEntry::parse));
            }
            entries
        })
    }
}

impl Default for KnownHostVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One known-hosts line: hostname aliases, key type, base64-encoded key.
struct KeyEntry {
    names: Vec<String>,
    key_type: String,
    key: Vec<u8>,
}

impl KeyEntry {
    /// Parse one known-hosts line.
    ///
    /// Comments and malformed lines yield `None` and are skipped; a skipped
    /// line can only narrow trust, never widen it.
    fn parse(line: &str) -> Option<Self> {
        let line: &str = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut parts = line.split_whitespace();
        let names: Vec<String> = parts.next()?.split(',').map(str::to_string).collect();
        let key_type: String = parts.next()?.to_string();
        let key: Vec<u8> = BASE64.decode(parts.next()?).ok()?;
        Some(Self {
            names,
            key_type,
            key,
        })
    }

    fn matches(&self, hostname: &str, key_type: &str, key: &[u8]) -> bool {
        self.names.iter().any(|name| name == hostname)
            && self.key_type == key_type
            && self.key == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use std::path::Path;
    use tempfile::TempDir;

    const KEY_BYTES: &[u8] = b"\x00\x00\x00\x13ecdsa-sha2-nistp256-test-key";

    fn write_known_hosts(dir: &Path, lines: &[String]) -> PathBuf {
        let path: PathBuf = dir.join("known_hosts");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn entry_line(names: &str) -> String {
        format!("{} ecdsa-sha2-nistp256 {}", names, BASE64.encode(KEY_BYTES))
    }

    fn verifier(dir: &TempDir, lines: &[String]) -> KnownHostVerifier {
        let path: PathBuf = write_known_hosts(dir.path(), lines);
        KnownHostVerifier::from_files(vec![path])
    }

    #[test]
    fn test_matching_entry_is_trusted() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(&dir, &[entry_line("share.example.com")]);

        assert!(v.verify("share.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
    }

    #[test]
    fn test_hostname_alias_list_matches() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(&dir, &[entry_line("share,share.example.com,10.0.0.4")]);

        assert!(v.verify("10.0.0.4", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
        assert!(!v.verify("other.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
    }

    #[test]
    fn test_nonstandard_port_is_rejected() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(&dir, &[entry_line("share.example.com")]);

        assert!(!v.verify("share.example.com", 2222, "ecdsa-sha2-nistp256", KEY_BYTES));
    }

    #[test]
    fn test_wrong_key_type_is_rejected() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(&dir, &[entry_line("share.example.com")]);

        assert!(!v.verify("share.example.com", 22, "ssh-rsa", KEY_BYTES));
    }

    #[test]
    fn test_wrong_key_bytes_are_rejected() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(&dir, &[entry_line("share.example.com")]);

        assert!(!v.verify("share.example.com", 22, "ecdsa-sha2-nistp256", b"different"));
    }

    #[test]
    fn test_comments_and_malformed_lines_are_skipped() {
        let dir: TempDir = TempDir::new().unwrap();
        let v: KnownHostVerifier = verifier(
            &dir,
            &[
                "# comment".to_string(),
                "malformed-line".to_string(),
                "host ssh-rsa not*base64".to_string(),
                entry_line("share.example.com"),
            ],
        );

        assert!(v.verify("share.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
        assert!(!v.verify("malformed-line", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
    }

    #[test]
    fn test_missing_files_trust_nothing() {
        let v: KnownHostVerifier =
            KnownHostVerifier::from_files(vec![PathBuf::from("/does/not/exist")]);

        assert!(!v.verify("share.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
    }

    #[test]
    fn test_entries_from_multiple_files_accumulate() {
        let dir: TempDir = TempDir::new().unwrap();
        let system: PathBuf = dir.path().join("system");
        let user: PathBuf = dir.path().join("user");
        std::fs::write(&system, entry_line("system.example.com")).unwrap();
        std::fs::write(&user, entry_line("user.example.com")).unwrap();
        let v: KnownHostVerifier = KnownHostVerifier::from_files(vec![system, user]);

        assert!(v.verify("system.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
        assert!(v.verify("user.example.com", 22, "ecdsa-sha2-nistp256", KEY_BYTES));
    }
}
