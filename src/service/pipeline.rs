use crate::engine::open_engine;
use crate::models::config::Config;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::report::{BatchReport, StageReport};
use crate::service::backup::{backup_databases, connection_failed, plan_backups};
use crate::service::cleanup::cleanup_old_backups;
use crate::service::upload::upload_backups;
use crate::transfer::Transport;
use crate::utils::progress::{create_progress_bar, create_spinner};
use indicatif::MultiProgress;
use log::info;
use std::path::Path;
use std::time::SystemTime;

pub struct RunOptions {
    pub dry_run_mode: DryRunMode,
    pub skip_upload: bool,
    pub skip_cleanup: bool,
    pub quiet: bool,
    /// Instant the retention window is measured back from
    pub now: SystemTime,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            dry_run_mode: DryRunMode::None,
            skip_upload: false,
            skip_cleanup: false,
            quiet: true,
            now: SystemTime::now(),
        }
    }
}

/// Backup, then upload (when a transport is given), then retention cleanup.
/// Every stage runs regardless of failures in the ones before it.
pub fn run_pipeline(
    config: &Config,
    options: &RunOptions,
    transport: Option<&dyn Transport>,
) -> BatchReport {
    let multi_progress = if !options.quiet {
        Some(MultiProgress::new())
    } else {
        None
    };
    let prefix = options.dry_run_mode.progress_prefix();
    let backup_dir = Path::new(&config.backup_location);
    let mut batch = BatchReport::default();

    // Stage 1: backups
    let report = if config.databases.is_empty() {
        info!("No databases configured, skipping backups");
        None
    } else if !options.dry_run_mode.should_run_backups() {
        Some(plan_backups(backup_dir, &config.databases, options.dry_run_mode))
    } else {
        let progress = multi_progress.as_ref().map(|mp| {
            mp.add(create_progress_bar(
                config.databases.len() as u64,
                &format!("{}[1/3] Backing up databases", prefix),
            ))
        });
        info!(
            "Backing up {} database(s) via {}",
            config.databases.len(),
            config.engine
        );
        let report = match open_engine(config) {
            Ok(mut engine) => {
                backup_databases(engine.as_mut(), backup_dir, &config.databases, progress.as_ref())
            }
            Err(e) => connection_failed(&config.databases, &e),
        };
        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} backed up", report.succeeded()));
        }
        Some(report)
    };
    record(&mut batch, report);

    // Stage 2: upload
    match (&config.transfer, transport) {
        (Some(transfer), Some(transport)) if !options.skip_upload => {
            let progress = multi_progress
                .as_ref()
                .map(|mp| mp.add(create_progress_bar(0, &format!("{}[2/3] Uploading", prefix))));
            let report = upload_backups(
                transport,
                backup_dir,
                &transfer.remote_path,
                options.dry_run_mode,
                progress.as_ref(),
            );
            if let Some(pb) = progress {
                pb.finish_with_message(format!("{} uploaded", report.succeeded()));
            }
            record(&mut batch, Some(report));
        }
        (Some(_), _) => info!("Skipping upload stage"),
        (None, _) => {}
    }

    // Stage 3: retention
    if options.skip_cleanup {
        info!("Skipping cleanup stage");
    } else {
        let spinner = multi_progress.as_ref().map(|mp| {
            mp.add(create_spinner(&format!(
                "{}[3/3] Removing backups older than {} days",
                prefix, config.backup_retention_days
            )))
        });
        let report = cleanup_old_backups(
            backup_dir,
            config.backup_retention_days,
            options.now,
            options.dry_run_mode,
            spinner.as_ref(),
        );
        if let Some(pb) = spinner {
            pb.finish_with_message(format!("{}[3/3] {} expired backups removed", prefix, report.succeeded()));
        }
        record(&mut batch, Some(report));
    }

    batch
}

fn record(batch: &mut BatchReport, report: Option<StageReport>) {
    if let Some(report) = report {
        info!("{}", report);
        batch.stages.push(report);
    }
}
