use crate::models::error::{BackupError, Result};
use chrono::{DateTime, Local};
use log::debug;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const BACKUP_EXTENSION: &str = "bak";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A `.bak` file found in the backup directory.
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub created: SystemTime,
}

impl BackupFile {
    /// Reads size and creation time from the filesystem. Falls back to the
    /// modification time where creation time is not recorded.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = path.metadata().map_err(|cause| BackupError::MetadataError {
            path: path.to_path_buf(),
            cause,
        })?;

        let created = match metadata.created() {
            Ok(created) => created,
            Err(e) => {
                debug!(
                    "Creation time unavailable for '{}' ({}), using modification time",
                    path.display(),
                    e
                );
                metadata
                    .modified()
                    .map_err(|cause| BackupError::MetadataError {
                        path: path.to_path_buf(),
                        cause,
                    })?
            }
        };

        Ok(BackupFile {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: metadata.len(),
            created,
        })
    }
}

/// `{database}_backup_{yyyyMMdd_HHmmss}.bak`
pub fn backup_file_name(database: &str, timestamp: &DateTime<Local>) -> String {
    format!(
        "{}_backup_{}.{}",
        database,
        timestamp.format(TIMESTAMP_FORMAT),
        BACKUP_EXTENSION
    )
}

pub fn is_backup_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(BACKUP_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_backup_file_name_format() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        assert_eq!(
            backup_file_name("Sales", &timestamp),
            "Sales_backup_20240309_070502.bak"
        );
    }

    #[test]
    fn test_backup_file_names_differ_by_second() {
        let first = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        let second = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        assert_ne!(
            backup_file_name("HR", &first),
            backup_file_name("HR", &second)
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file(Path::new("/b/Sales_backup_20240309_070502.bak")));
        assert!(is_backup_file(Path::new("/b/legacy.BAK")));
        assert!(!is_backup_file(Path::new("/b/notes.txt")));
        assert!(!is_backup_file(Path::new("/b/archive.bak.gz")));
        assert!(!is_backup_file(Path::new("/b/bak")));
    }

    #[test]
    fn test_from_path_reads_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sales_backup_20240309_070502.bak");
        fs::write(&path, b"0123456789").unwrap();

        let file = BackupFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "Sales_backup_20240309_070502.bak");
        assert_eq!(file.size, 10);
        assert!(file.created <= SystemTime::now());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = BackupFile::from_path(&dir.path().join("gone.bak"));
        assert!(matches!(result, Err(BackupError::MetadataError { .. })));
    }
}
