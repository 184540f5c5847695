use std::path::Path;
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use detbench::cli::{self, Cli, Commands};
use detbench::config::Settings;
use detbench::layout;
use detbench::tools::{ProcessLauncher, ToolKind};

/// Main entry point for detbench
///
/// Handles three commands:
/// - Detect: runs the detection tool for every combination
/// - Metrics: runs the metrics tool for every combination
/// - Plan: prints the invocations without running them
///
/// Usage errors and a missing dataset directory are reported on stdout and
/// exit with status 1 before anything else happens.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match cli::usage_error(&e) {
            Some(usage) => {
                print!("{}", usage);
                std::process::exit(1);
            }
            None => e.exit(),
        },
    };

    if let Err(e) = layout::ensure_directory(cli.command.directory()) {
        println!("{}", e);
        std::process::exit(1);
    }

    // Load settings first
    let settings = Settings::new(cli.config.as_deref()).context("Failed to load settings")?;

    let guard = init_logging(&settings)?;
    info!("detbench starting up...");
    info!("Settings loaded");

    let result = match &cli.command {
        Commands::Detect(args) => cli::run(ToolKind::Detect, args, &settings, ProcessLauncher).await,
        Commands::Metrics(args) => cli::run(ToolKind::Metrics, args, &settings, ProcessLauncher).await,
        Commands::Plan { directory, tool } => cli::plan(*tool, directory, &settings),
    };

    if let Err(e) = result {
        error!("{}", e);
        println!("{}", e);
        // Flush the log writer before exiting
        drop(guard);
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the daily rolling log file under the configured log directory.
///
/// `RUST_LOG` takes precedence over `logging.level` when set.
fn init_logging(settings: &Settings) -> anyhow::Result<WorkerGuard> {
    let log_path: &Path = settings.log_dir();
    std::fs::create_dir_all(log_path)
        .with_context(|| format!("Failed to create log directory {}", log_path.display()))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_path,
        "detbench",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let full_log_path = std::fs::canonicalize(log_path)?;
    info!("Log directory: {}", full_log_path.display());

    Ok(guard)
}
