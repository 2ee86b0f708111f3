mod engine;
mod models;
mod service;
mod transfer;
mod utils;

use crate::models::config::setup_config;
use crate::models::dry_run_mode::DryRunMode;
use crate::models::report::{Stage, EXIT_CONFIG_ERROR, EXIT_PARTIAL_FAILURE};
use crate::service::pipeline::{run_pipeline, RunOptions};
use crate::transfer::sftp::SftpTransport;
use crate::transfer::Transport;
use crate::utils::progress::format_bytes;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use models::config::Config;
use std::process::ExitCode;
use std::time::SystemTime;

#[derive(Parser)]
#[command(name = "db-backup-scheduler")]
#[command(
    about = "Backs up databases, ships the backups over SFTP and prunes expired files",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        default_value = "appsettings.json",
        env = "DB_BACKUP_CONFIG"
    )]
    config_file: String,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,

    /// Back up and upload, but only report which files cleanup would delete
    #[arg(short = 'd', long = "dry-run", conflicts_with = "dry_run_full")]
    dry_run: bool,

    /// Write, send and delete nothing; every stage only reports its plan
    #[arg(short = 'f', long = "dry-run-full", conflicts_with = "dry_run")]
    dry_run_full: bool,

    #[arg(long = "skip-upload")]
    skip_upload: bool,

    #[arg(long = "skip-cleanup")]
    skip_cleanup: bool,

    /// Exit 0 even when some backups, uploads or deletions failed
    #[arg(long = "ignore-failures")]
    ignore_failures: bool,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    match cli_main(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn cli_main(args: Cli) -> Result<u8> {
    info!("db-backup-scheduler starting...");
    let config: Config = setup_config(args.config_file).context("Failed to load configuration")?;
    debug!("Loaded config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(0);
    }

    let dry_run_mode = if args.dry_run_full {
        info!("Running in DRY RUN FULL mode - nothing will be written, uploaded or deleted");
        DryRunMode::Full
    } else if args.dry_run {
        info!("Running in DRY RUN CLEANUP mode - expired backups will be listed, not deleted");
        DryRunMode::Cleanup
    } else {
        DryRunMode::None
    };

    let transport = config.transfer.as_ref().map(SftpTransport::new);

    let options = RunOptions {
        dry_run_mode,
        skip_upload: args.skip_upload,
        skip_cleanup: args.skip_cleanup,
        quiet: args.quiet,
        now: SystemTime::now(),
    };

    let batch = run_pipeline(
        &config,
        &options,
        transport.as_ref().map(|t| t as &dyn Transport),
    );

    if let Some(upload) = batch.stage(Stage::Upload) {
        info!("Uploaded {} in {} file(s)", format_bytes(upload.bytes), upload.succeeded());
    }

    let code = batch.exit_code(args.ignore_failures);
    if batch.has_failures() {
        if code == EXIT_PARTIAL_FAILURE {
            warn!("Run finished with failures");
        } else {
            warn!("Run finished with failures (ignored by --ignore-failures)");
        }
    } else if dry_run_mode.is_dry_run() {
        info!("DRY RUN completed - see the plan above");
    } else {
        info!("Run completed successfully");
    }

    Ok(code)
}
