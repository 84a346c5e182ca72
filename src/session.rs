use std::fs::File;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Capability interface over the remote file store. The orchestrator only
/// ever talks to this trait, so tests can inject an in-memory fake instead
/// of a live SFTP endpoint. Per-operation errors are plain strings carrying
/// the underlying cause; they never abort the session.
pub trait RemoteStore {
    /// Copy the remote file at `remote_path` into `local_path`.
    fn fetch(&self, remote_path: &str, local_path: &Path) -> Result<(), String>;
    /// List entry names under `path`. Used once as a connectivity probe.
    fn list_directory(&self, path: &str) -> Result<Vec<String>, String>;
    /// Release the session. Must be safe to call more than once.
    fn close(&mut self);
}

/// A live authenticated SFTP session plus its underlying transport.
///
/// Owned by the run for its whole duration. `close()` is idempotent and is
/// also invoked from `Drop`, so the transport is released on every exit
/// path — normal completion, fatal error, or panic during the download
/// phase.
pub struct SftpSession {
    sftp: Option<ssh2::Sftp>,
    sess: Option<ssh2::Session>,
}

fn create_tcp_connection(addr: &str) -> anyhow::Result<TcpStream> {
    let mut addrs = addr.to_socket_addrs()?;
    let sock = addrs.next().ok_or_else(|| -> anyhow::Error {
        crate::ExtractError::SshNoAddress(addr.to_string()).into()
    })?;
    let tcp = TcpStream::connect_timeout(&sock, Duration::from_secs(10))?;
    let _ = tcp.set_read_timeout(Some(Duration::from_secs(30)));
    let _ = tcp.set_write_timeout(Some(Duration::from_secs(30)));
    Ok(tcp)
}

impl SftpSession {
    /// Establish the transport, handshake, authenticate with the password
    /// and open the SFTP channel. Each stage maps to its own error variant
    /// so auth rejections are distinguishable from connection failures.
    pub fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", host, port);
        let tcp = create_tcp_connection(&addr)?;
        let mut sess = ssh2::Session::new().map_err(|_| -> anyhow::Error {
            crate::ExtractError::SshSessionCreateFailed(addr.clone()).into()
        })?;
        sess.set_tcp_stream(tcp);
        sess.handshake().map_err(|_| -> anyhow::Error {
            crate::ExtractError::SshHandshakeFailed(addr.clone()).into()
        })?;

        sess.userauth_password(username, password).map_err(|_| -> anyhow::Error {
            crate::ExtractError::SshAuthFailed(addr.clone()).into()
        })?;
        if !sess.authenticated() {
            return Err(crate::ExtractError::SshAuthFailed(addr).into());
        }

        let sftp = sess.sftp().map_err(|e| -> anyhow::Error {
            crate::ExtractError::SftpCreateFailed(format!("{}", e)).into()
        })?;
        tracing::debug!("session established to {}", addr);
        Ok(Self { sftp: Some(sftp), sess: Some(sess) })
    }

    #[cfg(test)]
    fn detached() -> Self {
        Self { sftp: None, sess: None }
    }
}

impl RemoteStore for SftpSession {
    fn fetch(&self, remote_path: &str, local_path: &Path) -> Result<(), String> {
        let sftp = self.sftp.as_ref().ok_or_else(|| "session already closed".to_string())?;
        let mut remote = sftp
            .open(Path::new(remote_path))
            .map_err(|e| format!("open remote {}: {}", remote_path, e))?;
        let mut local = File::create(local_path)
            .map_err(|e| format!("create local {}: {}", local_path.display(), e))?;
        std::io::copy(&mut remote, &mut local)
            .map_err(|e| format!("copy {}: {}", remote_path, e))?;
        Ok(())
    }

    fn list_directory(&self, path: &str) -> Result<Vec<String>, String> {
        let sftp = self.sftp.as_ref().ok_or_else(|| "session already closed".to_string())?;
        let entries = sftp.readdir(Path::new(path)).map_err(|e| e.to_string())?;
        Ok(entries
            .into_iter()
            .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect())
    }

    fn close(&mut self) {
        // SFTP channel first, then the transport. Both Options are taken so
        // a second call is a no-op.
        if let Some(sftp) = self.sftp.take() {
            drop(sftp);
        }
        if let Some(sess) = self.sess.take() {
            let _ = sess.disconnect(Some(ssh2::DisconnectCode::ByApplication), "done", None);
            tracing::debug!("session closed");
        }
    }
}

impl Drop for SftpSession {
    fn drop(&mut self) {
        self.close();
    }
}
