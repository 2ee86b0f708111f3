use crate::models::config::TransferConfig;
use crate::models::error::{BackupError, Result};
use crate::transfer::Transport;
use log::debug;
use ssh2::{Session, Sftp};
use std::fs::File;
use std::io::{self, BufReader};
use std::net::TcpStream;
use std::path::Path;

const DEFAULT_SSH_PORT: u16 = 22;

/// Password-authenticated SFTP uploads. A new session is opened for every
/// file and closed once the file is stored.
pub struct SftpTransport {
    server: String,
    username: String,
    password: String,
}

impl SftpTransport {
    pub fn new(config: &TransferConfig) -> Self {
        SftpTransport {
            server: config.server.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn connect(&self) -> Result<(Sftp, Session)> {
        let address = with_default_port(&self.server);
        let tcp = TcpStream::connect(&address).map_err(|e| self.connection_error(e))?;

        let mut sess = Session::new().map_err(|e| self.connection_error(e))?;
        sess.set_tcp_stream(tcp);
        sess.handshake().map_err(|e| self.connection_error(e))?;

        sess.userauth_password(&self.username, &self.password)
            .map_err(|e| BackupError::TransferAuth {
                server: self.server.clone(),
                username: self.username.clone(),
                cause: e.to_string(),
            })?;

        let sftp = sess.sftp().map_err(|e| self.connection_error(e))?;
        debug!("SFTP session opened to {}", address);
        Ok((sftp, sess))
    }

    fn connection_error(&self, cause: impl ToString) -> BackupError {
        BackupError::TransferConnection {
            server: self.server.clone(),
            cause: cause.to_string(),
        }
    }
}

impl Transport for SftpTransport {
    fn upload(&self, local: &Path, remote_path: &str) -> Result<String> {
        let write_error = |cause: String| BackupError::TransferWrite {
            from: local.to_path_buf(),
            to: remote_path.to_string(),
            cause,
        };

        let file = File::open(local).map_err(|e| write_error(e.to_string()))?;
        let local_size = file
            .metadata()
            .map_err(|e| write_error(e.to_string()))?
            .len();

        let (sftp, sess) = self.connect()?;

        if let Some(parent) = Path::new(remote_path).parent() {
            ensure_remote_dir(&sftp, &parent.to_string_lossy());
        }

        let remote = Path::new(remote_path);
        {
            let mut remote_file = sftp.create(remote).map_err(|e| write_error(e.to_string()))?;
            io::copy(&mut BufReader::new(file), &mut remote_file)
                .map_err(|e| write_error(e.to_string()))?;
        }

        let stored = sftp
            .stat(remote)
            .map_err(|e| write_error(e.to_string()))?
            .size
            .unwrap_or(0);

        drop(sftp);
        let _ = sess.disconnect(None, "upload complete", None);

        verify_stored_size(stored, local_size, local, remote_path)
    }

    fn server(&self) -> &str {
        &self.server
    }
}

/// Creates every component of `path`, ignoring the ones that already exist.
fn ensure_remote_dir(sftp: &Sftp, path: &str) {
    for dir in remote_dir_chain(path) {
        let _ = sftp.mkdir(Path::new(&dir), 0o755);
    }
}

/// Every directory from the top of `path` down to `path` itself, in creation
/// order. The root and empty components are never listed.
fn remote_dir_chain(path: &str) -> Vec<String> {
    let root = if path.starts_with('/') { "/" } else { "" };
    let mut chain: Vec<String> = Vec::new();
    for part in path.split('/').filter(|s| !s.is_empty()) {
        let dir = match chain.last() {
            Some(parent) => format!("{}/{}", parent, part),
            None => format!("{}{}", root, part),
        };
        chain.push(dir);
    }
    chain
}

/// Status text for a stored file, or a write error when the server holds a
/// different number of bytes than were sent.
fn verify_stored_size(stored: u64, expected: u64, local: &Path, remote_path: &str) -> Result<String> {
    if stored != expected {
        return Err(BackupError::TransferWrite {
            from: local.to_path_buf(),
            to: remote_path.to_string(),
            cause: format!("remote reports {} bytes, expected {}", stored, expected),
        });
    }
    Ok(format!("{} bytes stored at {}", stored, remote_path))
}

/// Appends `:22` unless the address already names a port.
fn with_default_port(server: &str) -> String {
    if let Some(rest) = server.strip_prefix('[') {
        if rest.contains("]:") {
            return server.to_string();
        }
        return format!("{}:{}", server, DEFAULT_SSH_PORT);
    }
    match server.matches(':').count() {
        0 => format!("{}:{}", server, DEFAULT_SSH_PORT),
        1 => server.to_string(),
        // bare IPv6 address
        _ => format!("[{}]:{}", server, DEFAULT_SSH_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn transport_for(server: &str) -> SftpTransport {
        SftpTransport::new(&TransferConfig {
            server: server.to_string(),
            username: "backup".to_string(),
            password: "secret".to_string(),
            remote_path: "/srv/backups".to_string(),
        })
    }

    #[test]
    fn test_with_default_port() {
        assert_eq!(with_default_port("backup.example.com"), "backup.example.com:22");
        assert_eq!(with_default_port("backup.example.com:2222"), "backup.example.com:2222");
        assert_eq!(with_default_port("[::1]:2222"), "[::1]:2222");
        assert_eq!(with_default_port("[::1]"), "[::1]:22");
        assert_eq!(with_default_port("fe80::1"), "[fe80::1]:22");
    }

    #[test]
    fn test_remote_dir_chain() {
        assert_eq!(remote_dir_chain("/srv/a/b"), vec!["/srv", "/srv/a", "/srv/a/b"]);
        assert_eq!(remote_dir_chain("/srv//backups/"), vec!["/srv", "/srv/backups"]);
        assert_eq!(remote_dir_chain("incoming/db"), vec!["incoming", "incoming/db"]);
        assert!(remote_dir_chain("/").is_empty());
        assert!(remote_dir_chain("").is_empty());
    }

    #[test]
    fn test_verify_stored_size_reports_status_text() {
        let local = Path::new("/var/backups/Sales_backup_20240101_000000.bak");
        let remote = "/srv/backups/Sales_backup_20240101_000000.bak";

        let status = verify_stored_size(6, 6, local, remote).unwrap();

        assert_eq!(
            status,
            "6 bytes stored at /srv/backups/Sales_backup_20240101_000000.bak"
        );
    }

    #[test]
    fn test_verify_stored_size_rejects_truncated_file() {
        let local = Path::new("/var/backups/Sales_backup_20240101_000000.bak");
        let remote = "/srv/backups/Sales_backup_20240101_000000.bak";

        match verify_stored_size(4, 6, local, remote) {
            Err(BackupError::TransferWrite { from, to, cause }) => {
                assert_eq!(from, local);
                assert_eq!(to, remote);
                assert_eq!(cause, "remote reports 4 bytes, expected 6");
            }
            other => panic!("Expected TransferWrite, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_to_unreachable_server_fails_with_connection_error() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("Sales_backup_20240101_000000.bak");
        fs::write(&local, b"backup").unwrap();

        let transport = transport_for("127.0.0.1:1");
        let result = transport.upload(&local, "/srv/backups/Sales_backup_20240101_000000.bak");

        assert!(matches!(result, Err(BackupError::TransferConnection { .. })));
    }

    #[test]
    fn test_upload_of_missing_local_file_fails_before_connecting() {
        let dir = TempDir::new().unwrap();
        let transport = transport_for("127.0.0.1:1");

        let result = transport.upload(&dir.path().join("gone.bak"), "/srv/backups/gone.bak");

        assert!(matches!(result, Err(BackupError::TransferWrite { .. })));
    }
}
