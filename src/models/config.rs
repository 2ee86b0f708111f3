use crate::models::config_validator::validate_config;
use crate::models::error::{BackupError, Result};
use log::info;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Overrides `Transfer.Password` so the secret can stay out of the file.
pub const TRANSFER_PASSWORD_ENV: &str = "DB_BACKUP_TRANSFER_PASSWORD";

#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub connection_string: String,
    #[serde(default)]
    pub engine: EngineKind,
    pub backup_location: String,
    pub databases: Vec<String>,
    pub backup_retention_days: u32,
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

/// Database engine the backup command is issued against.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    SqlServer,
    Sqlite,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::SqlServer => write!(f, "sqlserver"),
            EngineKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferConfig {
    pub server: String,
    pub username: String,
    pub password: String,
    pub remote_path: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("connection_string", &"<redacted>")
            .field("engine", &self.engine)
            .field("backup_location", &self.backup_location)
            .field("databases", &self.databases)
            .field("backup_retention_days", &self.backup_retention_days)
            .field("transfer", &self.transfer)
            .finish()
    }
}

impl fmt::Debug for TransferConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remote_path", &self.remote_path)
            .finish()
    }
}

pub fn setup_config(config_file: String) -> Result<Config> {
    let config_path = PathBuf::from(config_file);
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| {
        BackupError::ConfigRead {
            path: config_path.clone(),
            cause,
        }
    })?;

    let mut config: Config = serde_json::from_str(&config_str).map_err(|cause| {
        BackupError::ConfigParse {
            path: config_path,
            cause,
        }
    })?;

    apply_env_overrides(&mut config);

    validate_config(&config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(transfer) = config.transfer.as_mut() {
        if let Ok(password) = std::env::var(TRANSFER_PASSWORD_ENV) {
            info!("Using transfer password from {}", TRANSFER_PASSWORD_ENV);
            transfer.password = password;
        }
    }
}
