pub mod sqlite;
pub mod sqlserver;

use crate::models::config::{Config, EngineKind};
use crate::models::error::Result;
use std::path::Path;

/// A connection able to write a full backup of a named database to a file.
///
/// One value is opened per run and shared by every database in the batch;
/// dropping it closes the connection.
pub trait BackupEngine {
    fn backup_database(&mut self, database: &str, destination: &Path) -> Result<()>;
}

/// Opens the engine selected by `Engine` with the configured connection string.
pub fn open_engine(config: &Config) -> Result<Box<dyn BackupEngine>> {
    match config.engine {
        EngineKind::SqlServer => Ok(Box::new(sqlserver::SqlServerEngine::connect(
            &config.connection_string,
        )?)),
        EngineKind::Sqlite => Ok(Box::new(sqlite::SqliteEngine::open(
            &config.connection_string,
        )?)),
    }
}
