use crate::engine::BackupEngine;
use crate::models::backup_file::backup_file_name;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::report::{ItemOutcome, Stage, StageReport};
use chrono::Local;
use indicatif::ProgressBar;
use log::{error, info};
use std::path::Path;

/// Writes one timestamped backup per database through `engine`.
///
/// A failing database is recorded and the loop moves on; no retry.
pub fn backup_databases(
    engine: &mut dyn BackupEngine,
    backup_dir: &Path,
    databases: &[String],
    progress: Option<&ProgressBar>,
) -> StageReport {
    let mut report = StageReport::new(Stage::Backup);

    for database in databases {
        if let Some(pb) = progress {
            pb.set_message(format!("Backing up {}", database));
        }

        let destination = backup_dir.join(backup_file_name(database, &Local::now()));
        match engine.backup_database(database, &destination) {
            Ok(()) => {
                info!(
                    "Database '{}' backed up successfully to '{}'",
                    database,
                    destination.display()
                );
                report.push(ItemOutcome::succeeded(
                    database.as_str(),
                    destination.display().to_string(),
                ));
            }
            Err(e) => {
                error!("Error backing up database '{}': {}", database, e);
                report.push(ItemOutcome::failed(database.as_str(), e));
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    report
}

/// Logs the file each database would be written to.
pub fn plan_backups(backup_dir: &Path, databases: &[String], dry_run_mode: DryRunMode) -> StageReport {
    let mut report = StageReport::new(Stage::Backup);
    for database in databases {
        let destination = backup_dir.join(backup_file_name(database, &Local::now()));
        info!(
            "{}Would back up database '{}' to '{}'",
            dry_run_mode.progress_prefix(),
            database,
            destination.display()
        );
        report.push(ItemOutcome::skipped(
            database.as_str(),
            destination.display().to_string(),
        ));
    }
    report
}

/// Every database fails with the same error when the engine cannot be opened.
pub fn connection_failed(databases: &[String], cause: &dyn std::fmt::Display) -> StageReport {
    let mut report = StageReport::new(Stage::Backup);
    for database in databases {
        error!("Error backing up database '{}': {}", database, cause);
        report.push(ItemOutcome::failed(database.as_str(), cause));
    }
    report
}
