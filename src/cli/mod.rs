//! CLI commands
//!
//! `detect` and `metrics` run one tool over every model / framework /
//! quantization combination of a dataset directory; `plan` only prints
//! what would run.

mod run;

pub use run::{plan, run};

use std::path::{Path, PathBuf};
use clap::{Args, Parser, Subcommand};
use clap::error::ErrorKind;
use crate::config::FailurePolicy;
use crate::error::RunnerError;
use crate::tools::ToolKind;

/// detbench - batch detection and metrics runner
#[derive(Parser, Debug)]
#[command(name = "detbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file, applied over config/default.toml and config/local.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by the two batch commands
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Dataset directory; its last path segment names the results
    pub directory: PathBuf,

    /// What to do after a failed invocation (defaults to runner.failure_policy)
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,

    /// Do not write the JSON summary next to the results
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detection tool for every combination
    Detect(RunArgs),

    /// Run the metrics tool for every combination
    Metrics(RunArgs),

    /// Print the invocations a batch would run, without running them
    Plan {
        /// Dataset directory
        directory: PathBuf,

        /// Which tool to plan for
        #[arg(long, value_enum, default_value = "detect")]
        tool: ToolKind,
    },
}

impl Commands {
    /// Dataset directory named on the command line.
    pub fn directory(&self) -> &Path {
        match self {
            Commands::Detect(args) | Commands::Metrics(args) => &args.directory,
            Commands::Plan { directory, .. } => directory,
        }
    }
}

/// Maps a clap error to the runner's usage error.
///
/// Returns `None` for help and version output, which are not failures.
pub fn usage_error(err: &clap::Error) -> Option<RunnerError> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(RunnerError::Usage(err.render().to_string())),
    }
}
