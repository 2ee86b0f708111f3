use std::fmt;

/// Exit code when every attempted item succeeded.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when at least one backup, upload or deletion failed.
pub const EXIT_PARTIAL_FAILURE: u8 = 1;
/// Exit code when the configuration could not be loaded; no stage ran.
pub const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Backup,
    Upload,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Backup => write!(f, "backup"),
            Stage::Upload => write!(f, "upload"),
            Stage::Cleanup => write!(f, "cleanup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(String),
    /// Planned but not performed (dry run)
    Skipped(String),
    Failed(String),
}

/// Result of one database backup, one upload or one deletion.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub subject: String,
    pub outcome: Outcome,
}

impl ItemOutcome {
    pub fn succeeded(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            outcome: Outcome::Succeeded(detail.into()),
        }
    }

    pub fn skipped(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            outcome: Outcome::Skipped(detail.into()),
        }
    }

    pub fn failed(subject: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            subject: subject.into(),
            outcome: Outcome::Failed(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub items: Vec<ItemOutcome>,
    /// Bytes uploaded for the upload stage, bytes freed for cleanup
    pub bytes: u64,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            items: Vec::new(),
            bytes: 0,
        }
    }

    pub fn push(&mut self, item: ItemOutcome) {
        self.items.push(item);
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Succeeded(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(ItemOutcome::is_failure)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} succeeded, {} failed, {} skipped",
            self.stage,
            self.succeeded(),
            self.failed(),
            self.skipped()
        )
    }
}

/// All stage reports of one run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub stages: Vec<StageReport>,
}

impl BatchReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(StageReport::has_failures)
    }

    pub fn exit_code(&self, ignore_failures: bool) -> u8 {
        if self.has_failures() && !ignore_failures {
            EXIT_PARTIAL_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }
}
