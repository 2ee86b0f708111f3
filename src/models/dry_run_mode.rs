/// Defines the dry-run behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunMode {
    /// Normal operation - back up, upload and delete expired files
    None,

    /// Backups and uploads run, the retention pass only reports
    /// which files it would delete
    Cleanup,

    /// Nothing is written, sent or deleted; every stage reports its plan
    Full,
}

impl DryRunMode {
    /// Returns true if this is any dry-run mode (Cleanup or Full)
    pub fn is_dry_run(&self) -> bool {
        matches!(self, DryRunMode::Cleanup | DryRunMode::Full)
    }

    pub fn should_run_backups(&self) -> bool {
        !matches!(self, DryRunMode::Full)
    }

    pub fn should_upload(&self) -> bool {
        !matches!(self, DryRunMode::Full)
    }

    pub fn should_delete(&self) -> bool {
        matches!(self, DryRunMode::None)
    }

    /// Get display string for progress bars and log lines
    pub fn progress_prefix(&self) -> &'static str {
        match self {
            DryRunMode::None => "",
            DryRunMode::Cleanup => "[DRY RUN - CLEANUP] ",
            DryRunMode::Full => "[DRY RUN - FULL] ",
        }
    }
}
