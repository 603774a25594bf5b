//! ssh2-backed share sessions.

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;

use async_trait::async_trait;
use ssh2::{HostKeyType, Session};
use tracing::debug;

use artifact_mirror_storage::{
    ExecOutput, ShareAuth, ShareConnector, ShareCredentials, ShareSession, StorageError,
};

use crate::known_hosts::KnownHostVerifier;

/// Opens SSH sessions against one share host.
pub struct SshShareConnector {
    host: String,
    port: u16,
    credentials: ShareCredentials,
}

impl SshShareConnector {
    /// Create a connector for the given host and credentials.
    pub fn new(host: impl Into<String>, port: u16, credentials: ShareCredentials) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
        }
    }

    fn ssh_error(&self, err: ssh2::Error) -> StorageError {
        StorageError::Ssh {
            host: self.host.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ShareConnector for SshShareConnector {
    fn host(&self) -> &str {
        &self.host
    }

    async fn connect(&self) -> Result<Box<dyn ShareSession>, StorageError> {
        let verifier: KnownHostVerifier = KnownHostVerifier::new();

        let tcp: TcpStream =
            TcpStream::connect((self.host.as_str(), self.port)).map_err(|err| {
                StorageError::Network {
                    message: format!("{}:{}: {}", self.host, self.port, err),
                }
            })?;
        let mut session: Session = Session::new().map_err(|err| self.ssh_error(err))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|err| self.ssh_error(err))?;

        // Trust is decided before any credentials are offered.
        let (key, key_type) = session.host_key().ok_or_else(|| StorageError::HostKeyRejected {
            host: self.host.clone(),
        })?;
        if !verifier.verify(&self.host, self.port, host_key_type_name(key_type), key) {
            return Err(StorageError::HostKeyRejected {
                host: self.host.clone(),
            });
        }

        let username: &str = &self.credentials.username;
        match &self.credentials.auth {
            ShareAuth::Password(password) => session
                .userauth_password(username, password)
                .map_err(|err| self.ssh_error(err))?,
            ShareAuth::PrivateKey(pem) => session
                .userauth_pubkey_memory(username, None, pem, None)
                .map_err(|err| self.ssh_error(err))?,
        }
        if !session.authenticated() {
            return Err(StorageError::AuthenticationFailed {
                host: self.host.clone(),
                user: username.to_string(),
            });
        }

        Ok(Box::new(SshShareSession {
            host: self.host.clone(),
            session,
        }))
    }
}

fn host_key_type_name(key_type: HostKeyType) -> &'static str {
    match key_type {
        HostKeyType::Rsa => "ssh-rsa",
        HostKeyType::Dss => "ssh-dss",
        HostKeyType::Ecdsa256 => "ecdsa-sha2-nistp256",
        HostKeyType::Ecdsa384 => "ecdsa-sha2-nistp384",
        HostKeyType::Ecdsa521 => "ecdsa-sha2-nistp521",
        HostKeyType::Ed25519 => "ssh-ed25519",
        _ => "unknown",
    }
}

/// One authenticated session. libssh2 calls block the calling thread.
pub struct SshShareSession {
    host: String,
    session: Session,
}

impl SshShareSession {
    fn ssh_error(&self, err: ssh2::Error) -> StorageError {
        StorageError::Ssh {
            host: self.host.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ShareSession for SshShareSession {
    async fn exec(&mut self, command: &str) -> Result<ExecOutput, StorageError> {
        debug!("{}: {}", self.host, command);
        let mut channel = self
            .session
            .channel_session()
            .map_err(|err| self.ssh_error(err))?;
        channel.exec(command).map_err(|err| self.ssh_error(err))?;

        let mut output: String = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|err| StorageError::from_io(self.host.clone(), err))?;
        let mut stderr: String = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|err| StorageError::from_io(self.host.clone(), err))?;
        output.push_str(&stderr);

        channel.wait_close().map_err(|err| self.ssh_error(err))?;
        let exit_status: i32 = channel.exit_status().map_err(|err| self.ssh_error(err))?;
        Ok(ExecOutput {
            exit_status,
            output,
        })
    }

    async fn upload(
        &mut self,
        local_path: &Path,
        remote_dir: &str,
        file_name: &str,
        mode: i32,
    ) -> Result<(), StorageError> {
        let mut local: std::fs::File = std::fs::File::open(local_path)
            .map_err(|err| StorageError::from_io(local_path.display().to_string(), err))?;
        let size: u64 = local
            .metadata()
            .map_err(|err| StorageError::from_io(local_path.display().to_string(), err))?
            .len();

        let remote_path: String = format!("{}/{}", remote_dir.trim_end_matches('/'), file_name);
        debug!("scp: {} -> {}:{}", local_path.display(), self.host, remote_path);

        let mut remote = self
            .session
            .scp_send(Path::new(&remote_path), mode, size, None)
            .map_err(|err| self.ssh_error(err))?;
        std::io::copy(&mut local, &mut remote)
            .map_err(|err| StorageError::from_io(remote_path.clone(), err))?;
        remote.send_eof().map_err(|err| self.ssh_error(err))?;
        remote.wait_eof().map_err(|err| self.ssh_error(err))?;
        remote.close().map_err(|err| self.ssh_error(err))?;
        remote.wait_close().map_err(|err| self.ssh_error(err))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.session
            .disconnect(None, "artifact mirror done", None)
            .map_err(|err| self.ssh_error(err))
    }
}
