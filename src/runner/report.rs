use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::catalog::Job;
use crate::config::FailurePolicy;
use crate::error::RunnerError;
use crate::layout;
use crate::tools::{Invocation, ToolKind};

/// Result of a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// The tool exited with status 0
    Succeeded,
    /// The tool exited non-zero, or was killed by a signal (`code` is `None`)
    Failed { code: Option<i32> },
    /// The tool could not be started
    SpawnFailed { message: String },
    /// Not run because the batch halted earlier
    Skipped,
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed { .. } | JobStatus::SpawnFailed { .. })
    }

    /// Short text for tables and logs.
    pub fn describe(&self) -> String {
        match self {
            JobStatus::Succeeded => "ok".to_string(),
            JobStatus::Failed { code: Some(code) } => format!("exit {}", code),
            JobStatus::Failed { code: None } => "killed".to_string(),
            JobStatus::SpawnFailed { message } => format!("spawn failed: {}", message),
            JobStatus::Skipped => "skipped".to_string(),
        }
    }
}

/// One row of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job: Job,
    pub invocation: Invocation,
    pub predictions: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
    pub duration_ms: u64,
}

impl JobOutcome {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Aggregated outcome of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub tool: ToolKind,
    pub directory: PathBuf,
    pub dataset: String,
    pub policy: FailurePolicy,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Job that stopped the batch under the halt policy
    pub halted_on: Option<String>,
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == JobStatus::Skipped)
            .count()
    }

    /// Number of jobs that were actually started or attempted.
    pub fn attempted(&self) -> usize {
        self.total() - self.skipped()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    /// Turns a halted batch into the matching error.
    pub fn halt_error(&self) -> Option<RunnerError> {
        self.halted_on.as_ref().map(|job| RunnerError::Halted {
            job: job.clone(),
            completed: self.attempted(),
            total: self.total(),
        })
    }

    /// Writes the report as pretty JSON under `results_dir` and returns the path.
    pub fn write_json(&self, results_dir: &Path) -> Result<PathBuf, RunnerError> {
        let path = layout::summary_path(results_dir, &self.dataset, self.tool.name());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
