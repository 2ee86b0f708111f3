use crate::models::config::{Config, TransferConfig};
use crate::models::error::{BackupError, Result};
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_connection_string(&config.connection_string)?;

    validate_backup_location(&config.backup_location)?;

    validate_retention(config.backup_retention_days)?;

    validate_databases(&config.databases)?;

    if let Some(transfer) = &config.transfer {
        validate_transfer(transfer)?;
    }

    info!("Configuration validation passed");
    Ok(())
}

fn validate_connection_string(connection_string: &str) -> Result<()> {
    if connection_string.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "ConnectionString must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate the local backup directory
fn validate_backup_location(location: &str) -> Result<()> {
    if location.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "BackupLocation must not be empty".to_string(),
        ));
    }

    let path = Path::new(location);

    if !path.exists() {
        #[cfg(windows)]
        let suggestion = format!("mkdir \"{}\"", location);
        #[cfg(not(windows))]
        let suggestion = format!("mkdir -p \"{}\"", location);

        return Err(BackupError::ConfigInvalid(format!(
            "BackupLocation does not exist: {}\nSuggestion: Create the directory with: {}",
            location, suggestion
        )));
    }

    if !path.is_dir() {
        return Err(BackupError::ConfigInvalid(format!(
            "BackupLocation is not a directory: {}",
            location
        )));
    }

    if let Err(e) = check_writable(path) {
        return Err(BackupError::ConfigInvalid(format!(
            "BackupLocation is not writable: {}\nError: {}",
            location, e
        )));
    }

    Ok(())
}

fn validate_retention(days: u32) -> Result<()> {
    if days == 0 {
        return Err(BackupError::ConfigInvalid(
            "BackupRetentionDays must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Database names end up in file names and in backup commands.
fn validate_databases(databases: &[String]) -> Result<()> {
    if databases.is_empty() {
        warn!("No databases configured; only upload and cleanup will run");
        return Ok(());
    }

    let mut seen = HashSet::new();
    for (idx, name) in databases.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(BackupError::ConfigInvalid(format!(
                "Database #{} has an empty name",
                idx + 1
            )));
        }

        if let Some(bad) = name
            .chars()
            .find(|c| matches!(c, '/' | '\\' | '\'' | '"') || c.is_control())
        {
            return Err(BackupError::ConfigInvalid(format!(
                "Database #{} name '{}' contains invalid character {:?}",
                idx + 1,
                name,
                bad
            )));
        }

        if !seen.insert(name.as_str()) {
            return Err(BackupError::ConfigInvalid(format!(
                "Database '{}' is listed more than once",
                name
            )));
        }
    }

    Ok(())
}

fn validate_transfer(transfer: &TransferConfig) -> Result<()> {
    if transfer.server.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "Transfer.Server must not be empty".to_string(),
        ));
    }
    if transfer.username.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "Transfer.Username must not be empty".to_string(),
        ));
    }
    if transfer.remote_path.trim().is_empty() {
        return Err(BackupError::ConfigInvalid(
            "Transfer.RemotePath must not be empty".to_string(),
        ));
    }
    if transfer.password.is_empty() {
        warn!(
            "Transfer.Password is empty; authentication as '{}' will likely fail",
            transfer.username
        );
    }
    Ok(())
}

/// Check if a directory is writable by attempting to create a temporary file
fn check_writable(path: &Path) -> std::io::Result<()> {
    let test_file = path.join(".db_backup_scheduler_write_test");

    fs::write(&test_file, b"test")?;

    fs::remove_file(&test_file)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::EngineKind;
    use tempfile::TempDir;

    fn create_test_config(backup_dir: &TempDir) -> Config {
        Config {
            connection_string: "Server=localhost".to_string(),
            engine: EngineKind::SqlServer,
            backup_location: backup_dir.path().to_str().unwrap().to_string(),
            databases: vec!["Sales".to_string(), "HR".to_string()],
            backup_retention_days: 7,
            transfer: None,
        }
    }

    fn create_test_transfer() -> TransferConfig {
        TransferConfig {
            server: "backup.example.com".to_string(),
            username: "backup".to_string(),
            password: "secret".to_string(),
            remote_path: "/srv/backups".to_string(),
        }
    }

    #[test]
    fn test_check_writable_temp_dir() {
        let temp_dir = std::env::temp_dir();
        assert!(check_writable(&temp_dir).is_ok());
    }

    #[test]
    fn test_validate_config_passes_for_valid_config() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.transfer = Some(create_test_transfer());

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_empty_connection_string() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.connection_string = "   ".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("ConnectionString"));
    }

    #[test]
    fn test_rejects_nonexistent_backup_location() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.backup_location = "/this/does/not/exist".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_rejects_backup_location_that_is_a_file() {
        let backup_dir = TempDir::new().unwrap();
        let file_path = backup_dir.path().join("not_a_dir.txt");
        fs::write(&file_path, b"x").unwrap();

        let mut config = create_test_config(&backup_dir);
        config.backup_location = file_path.to_str().unwrap().to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_rejects_zero_retention() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.backup_retention_days = 0;

        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("BackupRetentionDays"));
    }

    #[test]
    fn test_accepts_empty_database_list() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.databases.clear();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_database_names() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.databases.push("Sales".to_string());

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_unsafe_database_names() {
        let backup_dir = TempDir::new().unwrap();

        for name in ["", "../etc", "a\\b", "x'; DROP", "new\nline"] {
            let mut config = create_test_config(&backup_dir);
            config.databases = vec![name.to_string()];

            assert!(
                validate_config(&config).is_err(),
                "Expected database name {:?} to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_accepts_names_with_spaces_and_brackets() {
        let backup_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&backup_dir);
        config.databases = vec!["Sales Archive".to_string(), "odd]name".to_string()];

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_incomplete_transfer() {
        let backup_dir = TempDir::new().unwrap();

        let mut transfer = create_test_transfer();
        transfer.server = String::new();
        let mut config = create_test_config(&backup_dir);
        config.transfer = Some(transfer);
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("Transfer.Server"));

        let mut transfer = create_test_transfer();
        transfer.username = String::new();
        config.transfer = Some(transfer);
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("Transfer.Username"));

        let mut transfer = create_test_transfer();
        transfer.remote_path = String::new();
        config.transfer = Some(transfer);
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("Transfer.RemotePath"));
    }

    #[test]
    fn test_empty_transfer_password_only_warns() {
        let backup_dir = TempDir::new().unwrap();
        let mut transfer = create_test_transfer();
        transfer.password = String::new();
        let mut config = create_test_config(&backup_dir);
        config.transfer = Some(transfer);

        assert!(validate_config(&config).is_ok());
    }
}
