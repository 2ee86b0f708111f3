use crate::models::backup_file::is_backup_file;
use crate::models::error::{BackupError, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the `*.bak` files directly inside `dir`, sorted by name.
pub fn find_backup_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BackupError::DirectoryRead {
            path: dir.to_path_buf(),
            cause: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in '{}': {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_backup_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}
