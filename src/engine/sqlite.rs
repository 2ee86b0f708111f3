use crate::engine::BackupEngine;
use crate::models::error::{BackupError, Result};
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const ATTACH_ALIAS: &str = "backup_source";

/// SQLite engine: the connection string is a directory holding `<name>.db`
/// files. Each database is attached to one in-memory connection and written
/// out with `VACUUM ... INTO`.
pub struct SqliteEngine {
    data_dir: PathBuf,
    conn: Connection,
}

impl SqliteEngine {
    pub fn open(data_dir: &str) -> Result<Self> {
        let data_dir = PathBuf::from(data_dir);
        if !data_dir.is_dir() {
            return Err(BackupError::EngineConnection {
                engine: "sqlite".to_string(),
                cause: format!("data directory '{}' does not exist", data_dir.display()),
            });
        }

        let conn = Connection::open_in_memory().map_err(|e| BackupError::EngineConnection {
            engine: "sqlite".to_string(),
            cause: e.to_string(),
        })?;

        debug!("Opened SQLite engine over {}", data_dir.display());
        Ok(SqliteEngine { data_dir, conn })
    }

    fn source_path(&self, database: &str) -> PathBuf {
        self.data_dir.join(format!("{}.db", database))
    }

    fn vacuum_into(&self, source: &Path, destination: &Path) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", ATTACH_ALIAS),
            [source.to_string_lossy().into_owned()],
        )?;

        let result = self
            .conn
            .execute(
                &format!("VACUUM {} INTO ?1", ATTACH_ALIAS),
                [destination.to_string_lossy().into_owned()],
            )
            .map(|_| ());

        let detached = self
            .conn
            .execute(&format!("DETACH DATABASE {}", ATTACH_ALIAS), [])
            .map(|_| ());

        result.and(detached)
    }
}

impl BackupEngine for SqliteEngine {
    fn backup_database(&mut self, database: &str, destination: &Path) -> Result<()> {
        let source = self.source_path(database);
        // ATTACH would silently create an empty database
        if !source.is_file() {
            return Err(BackupError::DatabaseNotFound {
                database: database.to_string(),
                path: source,
            });
        }

        self.vacuum_into(&source, destination)
            .map_err(|e| BackupError::BackupCommand {
                database: database.to_string(),
                path: destination.to_path_buf(),
                cause: e.to_string(),
            })
    }
}
