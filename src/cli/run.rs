//! Batch and plan commands

use std::path::Path;
use colored::*;
use tracing::{info, warn};
use crate::config::Settings;
use crate::error::RunnerError;
use crate::runner::{display, BatchRunner};
use crate::tools::{Launcher, ToolKind};
use super::RunArgs;

/// Runs `tool` over every combination for `args.directory`.
///
/// Prints the outcome table, writes the JSON summary unless disabled, and
/// returns `RunnerError::Halted` when the halt policy stopped the batch.
pub async fn run<L: Launcher>(
    tool: ToolKind,
    args: &RunArgs,
    settings: &Settings,
    launcher: L,
) -> Result<(), RunnerError> {
    let mut runner = BatchRunner::new(settings.clone(), launcher);
    if let Some(policy) = args.on_failure {
        runner = runner.with_policy(policy);
    }

    let report = runner.run(tool, &args.directory).await?;
    display::display_report(&report);

    if !args.no_report {
        match report.write_json(&settings.runner.results_dir) {
            Ok(path) => {
                info!("Summary written to {}", path.display());
                println!("{}", format!("Summary: {}", path.display()).bright_black());
            }
            // Summary failures are logged, not fatal
            Err(e) => warn!("Could not write summary: {}", e),
        }
    }

    match report.halt_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Prints the invocations of a batch without spawning anything.
pub fn plan(tool: ToolKind, directory: &Path, settings: &Settings) -> Result<(), RunnerError> {
    // Planning never launches
    let runner = BatchRunner::new(settings.clone(), crate::tools::ProcessLauncher);
    let plan = runner.plan(tool, directory)?;
    display::display_plan(&plan);
    Ok(())
}
