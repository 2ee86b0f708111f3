use crate::models::backup_file::BackupFile;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::report::{ItemOutcome, Stage, StageReport};
use crate::transfer::{destination_identifier, remote_file_path, Transport};
use crate::utils::directory::find_backup_files;
use indicatif::ProgressBar;
use log::{error, info};
use std::path::Path;

/// Uploads every `*.bak` file in `backup_dir`, whichever run created it.
/// Files are never marked, so a second run uploads all of them again.
pub fn upload_backups(
    transport: &dyn Transport,
    backup_dir: &Path,
    remote_dir: &str,
    dry_run_mode: DryRunMode,
    progress: Option<&ProgressBar>,
) -> StageReport {
    let mut report = StageReport::new(Stage::Upload);

    let files = match find_backup_files(backup_dir) {
        Ok(files) => files,
        Err(e) => {
            error!("Error listing backups for upload: {}", e);
            report.push(ItemOutcome::failed(backup_dir.display().to_string(), e));
            return report;
        }
    };

    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
    }

    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let remote_path = remote_file_path(remote_dir, &file_name);
        let destination = destination_identifier(transport.server(), &remote_path);

        if let Some(pb) = progress {
            pb.set_message(format!("Uploading {}", file_name));
        }

        if !dry_run_mode.should_upload() {
            info!(
                "{}Would upload '{}' to '{}'",
                dry_run_mode.progress_prefix(),
                path.display(),
                destination
            );
            report.push(ItemOutcome::skipped(file_name, destination));
        } else {
            let outcome = BackupFile::from_path(&path).and_then(|file| {
                transport
                    .upload(&path, &remote_path)
                    .map(|status| (file.size, status))
            });
            match outcome {
                Ok((size, status)) => {
                    info!(
                        "Uploaded '{}' to '{}': {}",
                        path.display(),
                        destination,
                        status
                    );
                    report.bytes += size;
                    report.push(ItemOutcome::succeeded(file_name, status));
                }
                Err(e) => {
                    error!("Error uploading '{}' to '{}': {}", path.display(), destination, e);
                    report.push(ItemOutcome::failed(file_name, e));
                }
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    report
}
