use std::fmt;
use std::error::Error;
use std::path::PathBuf;

/// Errors raised by the batch runner itself.
///
/// Failures of the invoked tools are not errors: they are recorded in the
/// batch report. Only `Halted` turns a tool failure into an error, and only
/// when the halt policy is active.
#[derive(Debug)]
pub enum RunnerError {
    /// Wrong command line; carries the rendered usage text
    Usage(String),
    /// The input path is not an existing directory
    DirectoryNotFound(PathBuf),
    /// No usable dataset name could be derived from the input path
    InvalidDatasetName(String),
    /// An argument template could not be expanded
    Template(String),
    /// The batch stopped on the first failing job
    Halted { job: String, completed: usize, total: usize },
    /// Wraps std::io::Error for file operations
    Io(std::io::Error),
    /// The summary report could not be serialized
    Report(serde_json::Error),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Usage(usage) => write!(f, "{}", usage),
            RunnerError::DirectoryNotFound(path) => write!(f, "{} not found", path.display()),
            RunnerError::InvalidDatasetName(path) => {
                write!(f, "Cannot derive a dataset name from '{}'", path)
            }
            RunnerError::Template(msg) => write!(f, "Template error: {}", msg),
            RunnerError::Halted { job, completed, total } => write!(
                f,
                "Batch halted after {} failed ({} of {} jobs run)",
                job, completed, total
            ),
            RunnerError::Io(e) => write!(f, "I/O error: {}", e),
            RunnerError::Report(e) => write!(f, "Failed to write summary report: {}", e),
        }
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunnerError::Io(e) => Some(e),
            RunnerError::Report(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::Io(err)
    }
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        RunnerError::Report(err)
    }
}
