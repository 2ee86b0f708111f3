pub mod sftp;

use crate::models::error::Result;
use std::path::Path;

/// Pushes one local file to the remote server.
pub trait Transport {
    /// Uploads `local` to `remote_path` and returns the remote status text.
    fn upload(&self, local: &Path, remote_path: &str) -> Result<String>;

    /// Server address as configured, used to build destination identifiers.
    fn server(&self) -> &str;
}

/// Joins the remote directory and the file name with exactly one `/`.
pub fn remote_file_path(remote_dir: &str, file_name: &str) -> String {
    let dir = remote_dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{}", file_name)
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// Server address + remote path + file name, used in log lines.
pub fn destination_identifier(server: &str, remote_path: &str) -> String {
    if remote_path.starts_with('/') {
        format!("sftp://{}{}", server, remote_path)
    } else {
        format!("sftp://{}/{}", server, remote_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_path() {
        assert_eq!(remote_file_path("/srv/backups", "a.bak"), "/srv/backups/a.bak");
        assert_eq!(remote_file_path("/srv/backups/", "a.bak"), "/srv/backups/a.bak");
        assert_eq!(remote_file_path("/", "a.bak"), "/a.bak");
        assert_eq!(remote_file_path("incoming", "a.bak"), "incoming/a.bak");
    }

    #[test]
    fn test_destination_identifier() {
        assert_eq!(
            destination_identifier("backup.example.com:22", "/srv/backups/a.bak"),
            "sftp://backup.example.com:22/srv/backups/a.bak"
        );
        assert_eq!(
            destination_identifier("backup.example.com", "incoming/a.bak"),
            "sftp://backup.example.com/incoming/a.bak"
        );
    }
}
