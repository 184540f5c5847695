// Configuration management: built-in defaults, TOML files, environment overrides
use std::fmt;
use std::path::{Path, PathBuf};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File, Map};
use crate::catalog::{Catalog, DEFAULT_FRAMEWORKS, DEFAULT_MODELS, DEFAULT_QUANTIZATIONS, DEFAULT_QUANTIZED_FRAMEWORK};
use crate::tools::{ToolConfig, ToolKind};

/// What the runner does after a job fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and run the remaining jobs
    #[default]
    Continue,
    /// Stop the batch and skip the remaining jobs
    Halt,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Halt => write!(f, "halt"),
        }
    }
}

/// Command lines of the two external tools
#[derive(Debug, Deserialize, Clone)]
pub struct ToolsConfig {
    /// Detection tool, writes predictions
    pub detect: ToolConfig,
    /// Metrics tool, reads predictions and ground truths
    pub metrics: ToolConfig,
}

impl ToolsConfig {
    pub fn get(&self, kind: ToolKind) -> &ToolConfig {
        match kind {
            ToolKind::Detect => &self.detect,
            ToolKind::Metrics => &self.metrics,
        }
    }
}

/// Batch execution settings
#[derive(Debug, Deserialize, Clone)]
pub struct RunnerConfig {
    /// Root of the results tree
    pub results_dir: PathBuf,
    /// Ground truth file name inside the dataset directory
    pub ground_truths_file: String,
    /// Behaviour after a failed job
    pub failure_policy: FailurePolicy,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Directory receiving the rolling log files
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Models, frameworks and quantizations to iterate
    pub catalog: Catalog,
    /// External tool command lines
    pub tools: ToolsConfig,
    /// Batch execution settings
    pub runner: RunnerConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            tools: ToolsConfig {
                detect: ToolConfig::default_detect(),
                metrics: ToolConfig::default_metrics(),
            },
            runner: RunnerConfig {
                results_dir: PathBuf::from("results"),
                ground_truths_file: "ground_truths.jsonl".to_string(),
                failure_policy: FailurePolicy::Continue,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some(PathBuf::from("logs")),
            },
        }
    }
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    /// Loads settings from `./config` plus an optional explicit file.
    pub fn new(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::from_dir(&config_dir, explicit)
    }

    /// Loads settings in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with DETBENCH_ (`__` separates sections)
    /// 2. The explicit config file, if one was given
    /// 3. Local config file (local.toml) if present
    /// 4. Default config file (default.toml) if present
    /// 5. Built-in defaults
    pub fn from_dir(config_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(config_dir, explicit, None)
    }

    /// Same as [`Settings::from_dir`], reading `DETBENCH_*` variables from
    /// `env` instead of the process environment when it is given.
    ///
    /// List keys (catalog lists and tool arguments) are split on commas.
    pub fn from_sources(
        config_dir: &Path,
        explicit: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let detect = ToolConfig::default_detect();
        let metrics = ToolConfig::default_metrics();

        let mut builder = Config::builder()
            .set_default("catalog.models", strings(DEFAULT_MODELS))?
            .set_default("catalog.frameworks", strings(DEFAULT_FRAMEWORKS))?
            .set_default("catalog.quantizations", strings(DEFAULT_QUANTIZATIONS))?
            .set_default("catalog.quantized_framework", DEFAULT_QUANTIZED_FRAMEWORK)?
            .set_default("tools.detect.program", detect.program)?
            .set_default("tools.detect.args", detect.args)?
            .set_default("tools.detect.quantized_args", detect.quantized_args)?
            .set_default("tools.metrics.program", metrics.program)?
            .set_default("tools.metrics.args", metrics.args)?
            .set_default("tools.metrics.quantized_args", metrics.quantized_args)?
            .set_default("runner.results_dir", "results")?
            .set_default("runner.ground_truths_file", "ground_truths.jsonl")?
            .set_default("runner.failure_policy", "continue")?
            .set_default("logging.level", "info")?
            .set_default("logging.file", "logs")?
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false));

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::Message(
                    format!("Configuration file not found at: {}", path.display())
                ));
            }
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("DETBENCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("catalog.models")
                    .with_list_parse_key("catalog.frameworks")
                    .with_list_parse_key("catalog.quantizations")
                    .with_list_parse_key("tools.detect.args")
                    .with_list_parse_key("tools.detect.quantized_args")
                    .with_list_parse_key("tools.metrics.args")
                    .with_list_parse_key("tools.metrics.quantized_args")
                    .source(env),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.validate().map_err(ConfigError::Message)?;

        self.tools.detect.validate("detect").map_err(ConfigError::Message)?;
        self.tools.metrics.validate("metrics").map_err(ConfigError::Message)?;

        if self.runner.results_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "runner.results_dir must not be empty".to_string()
            ));
        }

        if self.runner.ground_truths_file.trim().is_empty() {
            return Err(ConfigError::Message(
                "runner.ground_truths_file must not be empty".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        Ok(())
    }

    /// Directory receiving log files, `logs` when unset.
    pub fn log_dir(&self) -> &Path {
        self.logging.file.as_deref().unwrap_or_else(|| Path::new("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_dir(dir.path(), None).unwrap();

        assert_eq!(settings.catalog, Catalog::default());
        assert_eq!(settings.tools.detect, ToolConfig::default_detect());
        assert_eq!(settings.tools.metrics, ToolConfig::default_metrics());
        assert_eq!(settings.runner.results_dir, PathBuf::from("results"));
        assert_eq!(settings.runner.failure_policy, FailurePolicy::Continue);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_default_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
            [catalog]
            models = ["yolov5n"]
            quantizations = ["fp16", "int8"]

            [runner]
            failure_policy = "halt"
            "#,
        )
        .unwrap();

        let settings = Settings::from_dir(dir.path(), None).unwrap();
        assert_eq!(settings.catalog.models, vec!["yolov5n"]);
        assert_eq!(settings.catalog.quantizations, vec!["fp16", "int8"]);
        // Untouched keys keep their defaults
        assert_eq!(settings.catalog.frameworks.len(), 6);
        assert_eq!(settings.runner.failure_policy, FailurePolicy::Halt);
    }

    #[test]
    fn test_local_and_explicit_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[logging]\nlevel = \"warn\"\n").unwrap();
        fs::write(dir.path().join("local.toml"), "[logging]\nlevel = \"debug\"\n").unwrap();

        let settings = Settings::from_dir(dir.path(), None).unwrap();
        assert_eq!(settings.logging.level, "debug");

        let explicit = dir.path().join("ci.toml");
        fs::write(&explicit, "[logging]\nlevel = \"error\"\n").unwrap();
        let settings = Settings::from_dir(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(settings.logging.level, "error");
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::from_dir(dir.path(), Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();
        let err = Settings::from_dir(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Invalid logging level"));

        fs::write(
            dir.path().join("default.toml"),
            "[tools.detect]\nprogram = \"python\"\nargs = [\"{weights}\"]\n",
        )
        .unwrap();
        let err = Settings::from_dir(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("unknown placeholder"));

        fs::write(dir.path().join("default.toml"), "[catalog]\nmodels = []\n").unwrap();
        let err = Settings::from_dir(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_environment_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_sources(
            dir.path(),
            None,
            env(&[
                ("DETBENCH_CATALOG__MODELS", "yolov5n,yolov5s"),
                ("DETBENCH_RUNNER__FAILURE_POLICY", "halt"),
                ("DETBENCH_LOGGING__LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.catalog.models, vec!["yolov5n", "yolov5s"]);
        assert_eq!(settings.catalog.job_count(), 16);
        assert_eq!(settings.runner.failure_policy, FailurePolicy::Halt);
        assert_eq!(settings.logging.level, "debug");
        // Other keys keep their defaults
        assert_eq!(settings.catalog.frameworks.len(), 6);
    }

    #[test]
    fn test_environment_beats_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("ci.toml");
        fs::write(
            &explicit,
            "[runner]\nfailure_policy = \"continue\"\n[catalog]\nquantizations = [\"int8\"]\n",
        )
        .unwrap();

        let settings = Settings::from_sources(
            dir.path(),
            Some(&explicit),
            env(&[("DETBENCH_RUNNER__FAILURE_POLICY", "halt")]),
        )
        .unwrap();

        assert_eq!(settings.runner.failure_policy, FailurePolicy::Halt);
        // The explicit file still applies where the environment is silent
        assert_eq!(settings.catalog.quantizations, vec!["int8"]);
    }

    #[test]
    fn test_environment_tool_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_sources(
            dir.path(),
            None,
            env(&[
                ("DETBENCH_TOOLS__DETECT__PROGRAM", "yolo-detect"),
                ("DETBENCH_TOOLS__DETECT__ARGS", "--model,{model},--out,{predictions}"),
                ("DETBENCH_TOOLS__METRICS__QUANTIZED_ARGS", "--precision,{quantize}"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.tools.detect.program, "yolo-detect");
        assert_eq!(
            settings.tools.detect.args,
            vec!["--model", "{model}", "--out", "{predictions}"]
        );
        assert_eq!(settings.tools.metrics.quantized_args, vec!["--precision", "{quantize}"]);
        assert_eq!(settings.tools.metrics.args, ToolConfig::default_metrics().args);
    }

    #[test]
    fn test_environment_values_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::from_sources(
            dir.path(),
            None,
            env(&[("DETBENCH_TOOLS__DETECT__ARGS", "{weights}")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown placeholder"));
    }

    #[test]
    fn test_log_dir_default() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_dir(), Path::new("logs"));
        settings.logging.file = None;
        assert_eq!(settings.log_dir(), Path::new("logs"));
    }
}
