use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Failed to connect to database engine '{engine}': {cause}")]
    EngineConnection { engine: String, cause: String },

    #[error("Backup of database '{database}' to '{path}' failed: {cause}")]
    BackupCommand {
        database: String,
        path: PathBuf,
        cause: String,
    },

    #[error("Database '{database}' not found at '{path}'")]
    DatabaseNotFound { database: String, path: PathBuf },

    #[error("Failed to read directory '{path}': {cause}")]
    DirectoryRead { path: PathBuf, cause: String },

    #[error("Failed to get metadata for '{path}': {cause}")]
    MetadataError { path: PathBuf, cause: io::Error },

    #[error("Failed to delete '{path}': {cause}")]
    FileDelete { path: PathBuf, cause: io::Error },

    #[error("Failed to connect to transfer server '{server}': {cause}")]
    TransferConnection { server: String, cause: String },

    #[error("Authentication as '{username}' on '{server}' failed: {cause}")]
    TransferAuth {
        server: String,
        username: String,
        cause: String,
    },

    #[error("Failed to upload '{from}' to '{to}': {cause}")]
    TransferWrite {
        from: PathBuf,
        to: String,
        cause: String,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
