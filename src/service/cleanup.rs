use crate::models::backup_file::BackupFile;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::error::BackupError;
use crate::models::report::{ItemOutcome, Stage, StageReport};
use crate::utils::directory::find_backup_files;
use crate::utils::progress::format_bytes;
use indicatif::ProgressBar;
use log::{debug, error, info};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: u64 = 86_400;

/// True when `created` lies strictly before `now - retention_days`.
pub fn is_expired(created: SystemTime, now: SystemTime, retention_days: u32) -> bool {
    let window = Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY);
    match now.checked_sub(window) {
        Some(cutoff) => created < cutoff,
        None => false,
    }
}

/// Deletes every `*.bak` file in `backup_dir` created before the retention
/// window. Failures are isolated per file.
pub fn cleanup_old_backups(
    backup_dir: &Path,
    retention_days: u32,
    now: SystemTime,
    dry_run_mode: DryRunMode,
    progress: Option<&ProgressBar>,
) -> StageReport {
    let mut report = StageReport::new(Stage::Cleanup);

    let files = match find_backup_files(backup_dir) {
        Ok(files) => files,
        Err(e) => {
            error!("Error during cleanup of old backups: {}", e);
            report.push(ItemOutcome::failed(backup_dir.display().to_string(), e));
            return report;
        }
    };

    for path in files {
        if let Some(pb) = progress {
            pb.set_message(format!("Checking {}", path.display()));
        }

        let file = match BackupFile::from_path(&path) {
            Ok(file) => file,
            Err(e) => {
                error!("Error during cleanup of '{}': {}", path.display(), e);
                report.push(ItemOutcome::failed(path.display().to_string(), e));
                continue;
            }
        };

        if !is_expired(file.created, now, retention_days) {
            debug!("Keeping {}", file.path.display());
            continue;
        }

        if !dry_run_mode.should_delete() {
            info!(
                "{}Would delete old backup file: {}",
                dry_run_mode.progress_prefix(),
                file.path.display()
            );
            report.push(ItemOutcome::skipped(file.file_name, "expired"));
            continue;
        }

        match fs::remove_file(&file.path) {
            Ok(()) => {
                info!("Deleted old backup file: {}", file.path.display());
                report.bytes += file.size;
                let detail = format!("deleted {}", file.path.display());
                report.push(ItemOutcome::succeeded(file.file_name, detail));
            }
            Err(cause) => {
                let e = BackupError::FileDelete {
                    path: file.path.clone(),
                    cause,
                };
                error!("Error during cleanup of old backups: {}", e);
                report.push(ItemOutcome::failed(file.file_name, e));
            }
        }
    }

    if report.succeeded() > 0 {
        info!(
            "Deleted {} expired backups, freed {}",
            report.succeeded(),
            format_bytes(report.bytes)
        );
    }

    report
}
