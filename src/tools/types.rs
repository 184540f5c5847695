use std::fmt;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The two external collaborators a batch can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Runs a detector and writes a predictions artifact
    Detect,
    /// Scores a predictions artifact against the dataset ground truths
    Metrics,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Detect => "detect",
            ToolKind::Metrics => "metrics",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Command line of one external tool.
///
/// `args` and `quantized_args` are templates, see [`super::PLACEHOLDERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable to spawn, looked up on PATH
    pub program: String,
    /// Arguments passed for every job
    #[serde(default)]
    pub args: Vec<String>,
    /// Arguments appended for quantized jobs only
    #[serde(default)]
    pub quantized_args: Vec<String>,
}

impl ToolConfig {
    pub fn default_detect() -> Self {
        Self {
            program: "python".to_string(),
            args: [
                "detect.py",
                "--model", "{model}",
                "--framework", "{framework}",
                "--image-dir", "{directory}",
                "--output", "{predictions}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            quantized_args: vec!["--quantize".to_string(), "{quantize}".to_string()],
        }
    }

    pub fn default_metrics() -> Self {
        Self {
            program: "python".to_string(),
            args: [
                "metrics.py",
                "--ground-truths", "{ground_truths}",
                "--predictions", "{predictions}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            quantized_args: Vec::new(),
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err(format!("tools.{}.program must not be empty", name));
        }
        for template in self.args.iter().chain(self.quantized_args.iter()) {
            super::validate_template(template)
                .map_err(|e| format!("tools.{}: {}", name, e))?;
        }
        Ok(())
    }
}
