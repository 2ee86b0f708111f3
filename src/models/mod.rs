pub mod backup_file;
pub mod config;
pub mod config_validator;
pub mod dry_run_mode;
pub mod error;
pub mod report;
