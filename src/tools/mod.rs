mod types;
mod template;
mod launcher;

pub use types::{ToolConfig, ToolKind};
pub use template::{validate_template, JobContext, PLACEHOLDERS};
pub use launcher::{Invocation, Launcher, ProcessExit, ProcessLauncher};
