use crate::engine::BackupEngine;
use crate::models::error::{BackupError, Result};
use log::{debug, info};
use std::path::Path;
use tiberius::{Client, Config as TdsConfig};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// SQL Server engine. The backup file is written by the server process, so
/// the backup directory must be a path the server can reach.
pub struct SqlServerEngine {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl SqlServerEngine {
    /// Connects with an ADO.NET style connection string
    /// (`Server=tcp:host,1433;User Id=...;Password=...`).
    pub fn connect(connection_string: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        let config = TdsConfig::from_ado_string(connection_string)
            .map_err(|e| connection_error(e.to_string()))?;

        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| connection_error(e.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|e| connection_error(e.to_string()))?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| connection_error(e.to_string()))
        })?;

        info!("Connected to SQL Server");
        Ok(SqlServerEngine { runtime, client })
    }
}

impl BackupEngine for SqlServerEngine {
    fn backup_database(&mut self, database: &str, destination: &Path) -> Result<()> {
        let query = backup_query(database, destination);
        debug!("Executing: {}", query);

        let client = &mut self.client;
        self.runtime
            .block_on(async {
                client.simple_query(query).await?.into_results().await?;
                Ok::<_, tiberius::error::Error>(())
            })
            .map_err(|e| BackupError::BackupCommand {
                database: database.to_string(),
                path: destination.to_path_buf(),
                cause: e.to_string(),
            })
    }
}

fn connection_error(cause: String) -> BackupError {
    BackupError::EngineConnection {
        engine: "sqlserver".to_string(),
        cause,
    }
}

/// `BACKUP DATABASE [name] TO DISK = N'path'`
pub fn backup_query(database: &str, destination: &Path) -> String {
    format!(
        "BACKUP DATABASE {} TO DISK = {}",
        quote_identifier(database),
        quote_literal(&destination.to_string_lossy())
    )
}

fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn quote_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}
