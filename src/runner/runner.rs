use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use crate::catalog::Job;
use crate::config::{FailurePolicy, Settings};
use crate::error::RunnerError;
use crate::layout;
use crate::tools::{Invocation, JobContext, Launcher, ToolKind};
use super::report::{BatchReport, JobOutcome, JobStatus};

/// A job together with the command line that will run it.
#[derive(Debug, Clone)]
pub struct PlannedJob {
    pub job: Job,
    pub predictions: PathBuf,
    pub invocation: Invocation,
}

/// Every invocation of one batch, built before anything is spawned.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub tool: ToolKind,
    pub directory: PathBuf,
    pub dataset: String,
    pub jobs: Vec<PlannedJob>,
}

/// Runs one tool over every catalog combination for a dataset directory.
///
/// Jobs run strictly one after another; each child is awaited before the
/// next one starts.
pub struct BatchRunner<L: Launcher> {
    settings: Settings,
    launcher: L,
    policy: FailurePolicy,
    progress: ProgressBar,
}

impl<L: Launcher> BatchRunner<L> {
    pub fn new(settings: Settings, launcher: L) -> Self {
        let policy = settings.runner.failure_policy;
        Self {
            settings,
            launcher,
            policy,
            progress: styled_bar(),
        }
    }

    /// Overrides the configured failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Hides the progress bar when `show_progress` is false.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        if !show_progress {
            self.progress = ProgressBar::hidden();
        }
        self
    }

    /// Bar advanced once per job, skipped jobs included.
    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Validates `directory` and expands every invocation of the batch.
    pub fn plan(&self, tool: ToolKind, directory: &Path) -> Result<BatchPlan, RunnerError> {
        layout::ensure_directory(directory)?;
        let dataset = layout::dataset_name(directory)?;
        let tool_config = self.settings.tools.get(tool);
        let results_dir = self.settings.runner.results_dir.as_path();

        let jobs = self
            .settings
            .catalog
            .jobs()
            .into_iter()
            .map(|job| -> Result<PlannedJob, RunnerError> {
                let ctx = JobContext::new(
                    directory,
                    &dataset,
                    results_dir,
                    &self.settings.runner.ground_truths_file,
                    &job,
                );
                let invocation = Invocation::build(tool_config, &ctx)?;
                let predictions = ctx.predictions.clone();
                Ok(PlannedJob { job, predictions, invocation })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchPlan {
            tool,
            directory: directory.to_path_buf(),
            dataset,
            jobs,
        })
    }

    /// Plans and runs the batch, returning the per-job outcomes.
    ///
    /// Tool failures never produce an `Err`; under the halt policy the
    /// report's `halted_on` names the job that stopped the batch.
    pub async fn run(&self, tool: ToolKind, directory: &Path) -> Result<BatchReport, RunnerError> {
        let plan = self.plan(tool, directory)?;
        Ok(self.execute(plan).await)
    }

    /// Runs an already built plan.
    pub async fn execute(&self, plan: BatchPlan) -> BatchReport {
        let total = plan.jobs.len();
        let started_at = Utc::now();
        info!(
            "Starting {} batch for dataset '{}' ({} jobs, on failure: {})",
            plan.tool, plan.dataset, total, self.policy
        );

        let pb = &self.progress;
        pb.reset();
        pb.set_length(total as u64);
        let mut outcomes = Vec::with_capacity(total);
        let mut halted_on: Option<String> = None;

        for (i, planned) in plan.jobs.into_iter().enumerate() {
            let key = planned.job.result_key();

            if halted_on.is_some() {
                outcomes.push(outcome(planned, JobStatus::Skipped, Duration::ZERO));
                pb.inc(1);
                continue;
            }

            pb.set_message(format!("{} {}", plan.tool, key));
            info!("[{}/{}] {}: {}", i + 1, total, key, planned.invocation);

            let start = Instant::now();
            let status = match self.launcher.launch(&planned.invocation, pb).await {
                Ok(exit) if exit.success() => JobStatus::Succeeded,
                Ok(exit) => JobStatus::Failed { code: exit.code },
                Err(e) => JobStatus::SpawnFailed { message: e.to_string() },
            };
            let elapsed = start.elapsed();

            if status.is_success() {
                info!("[{}/{}] {} finished in {:.1}s", i + 1, total, key, elapsed.as_secs_f64());
            } else {
                warn!("[{}/{}] {} failed: {}", i + 1, total, key, status.describe());
                if self.policy == FailurePolicy::Halt {
                    error!("Halting batch after {} failed", key);
                    halted_on = Some(key);
                }
            }

            outcomes.push(outcome(planned, status, elapsed));
            pb.inc(1);
        }

        let report = BatchReport {
            tool: plan.tool,
            directory: plan.directory,
            dataset: plan.dataset,
            policy: self.policy,
            started_at,
            finished_at: Utc::now(),
            halted_on,
            outcomes,
        };

        pb.finish_and_clear();
        info!(
            "{} batch done: {} succeeded, {} failed, {} skipped",
            report.tool,
            report.succeeded(),
            report.failed(),
            report.skipped()
        );

        report
    }
}

fn styled_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {wide_msg}")
    {
        pb.set_style(style);
    }
    pb
}

fn outcome(planned: PlannedJob, status: JobStatus, elapsed: Duration) -> JobOutcome {
    JobOutcome {
        job: planned.job,
        invocation: planned.invocation,
        predictions: planned.predictions,
        status,
        duration_ms: elapsed.as_millis() as u64,
    }
}
