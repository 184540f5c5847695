use std::fmt;
use std::process::Stdio;
use async_trait::async_trait;
use serde::Serialize;
use indicatif::ProgressBar;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use crate::error::RunnerError;
use super::template::JobContext;
use super::types::ToolConfig;

/// A fully expanded command line for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Expands `tool`'s templates for the job described by `ctx`.
    pub fn build(tool: &ToolConfig, ctx: &JobContext<'_>) -> Result<Self, RunnerError> {
        let mut args = tool
            .args
            .iter()
            .map(|template| ctx.expand(template))
            .collect::<Result<Vec<_>, _>>()?;

        if ctx.job.variant.is_quantized() {
            for template in &tool.quantized_args {
                args.push(ctx.expand(template)?);
            }
        }

        Ok(Self {
            program: tool.program.clone(),
            args,
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessExit {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs invocations to completion.
///
/// `progress` is the batch's progress bar; anything a launcher prints must
/// go through it so the bar is not overwritten. An `Err` means the process
/// could not be started at all.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, invocation: &Invocation, progress: &ProgressBar) -> std::io::Result<ProcessExit>;
}

/// Spawns real child processes and relays their output line by line.
///
/// While the bar is visible, child lines are printed above it; when it is
/// hidden they go straight to our own stdout and stderr.
#[derive(Debug, Default, Clone)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, invocation: &Invocation, progress: &ProgressBar) -> std::io::Result<ProcessExit> {
        debug!("Spawning: {}", invocation);
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = relay(child.stdout.take(), progress, Stream::Stdout);
        let stderr = relay(child.stderr.take(), progress, Stream::Stderr);
        let (status, _, _) = tokio::join!(child.wait(), stdout, stderr);

        Ok(ProcessExit { code: status?.code() })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Copies `reader` line by line until EOF, keeping the pipe drained.
async fn relay<R: AsyncRead + Unpin>(reader: Option<R>, progress: &ProgressBar, stream: Stream) {
    let Some(reader) = reader else { return };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if !progress.is_hidden() {
                    progress.println(line);
                } else {
                    match stream {
                        Stream::Stdout => println!("{}", line),
                        Stream::Stderr => eprintln!("{}", line),
                    }
                }
            }
            Err(e) => {
                warn!("Stopped relaying child {:?}: {}", stream, e);
                break;
            }
        }
    }
}
