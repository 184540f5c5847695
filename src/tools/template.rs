use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::catalog::Job;
use crate::error::RunnerError;
use crate::layout;

/// Placeholders recognised in tool argument templates
pub const PLACEHOLDERS: &[&str] = &[
    "directory",
    "dataset",
    "model",
    "framework",
    "quantize",
    "predictions",
    "ground_truths",
    "results_dir",
];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_]+)\}").expect("placeholder pattern is valid"));

/// Rejects templates naming a placeholder we cannot fill.
pub fn validate_template(template: &str) -> Result<(), String> {
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !PLACEHOLDERS.contains(&name) {
            return Err(format!(
                "unknown placeholder '{{{}}}' in '{}' (expected one of: {})",
                name,
                template,
                PLACEHOLDERS.join(", ")
            ));
        }
    }
    Ok(())
}

/// Everything a single job's arguments may refer to.
#[derive(Debug, Clone)]
pub struct JobContext<'a> {
    pub directory: &'a Path,
    pub dataset: &'a str,
    pub results_dir: &'a Path,
    pub job: &'a Job,
    pub ground_truths: PathBuf,
    pub predictions: PathBuf,
}

impl<'a> JobContext<'a> {
    pub fn new(
        directory: &'a Path,
        dataset: &'a str,
        results_dir: &'a Path,
        ground_truths_file: &str,
        job: &'a Job,
    ) -> Self {
        Self {
            directory,
            dataset,
            results_dir,
            job,
            ground_truths: layout::ground_truths_path(directory, ground_truths_file),
            predictions: layout::build_result_path(results_dir, dataset, &job.model, &job.variant),
        }
    }

    fn value(&self, name: &str) -> Option<String> {
        let value = match name {
            "directory" => self.directory.display().to_string(),
            "dataset" => self.dataset.to_string(),
            "model" => self.job.model.clone(),
            "framework" => self.job.variant.framework().to_string(),
            "quantize" => self.job.variant.quantization().unwrap_or_default().to_string(),
            "predictions" => self.predictions.display().to_string(),
            "ground_truths" => self.ground_truths.display().to_string(),
            "results_dir" => self.results_dir.display().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Substitutes every placeholder in `template`.
    pub fn expand(&self, template: &str) -> Result<String, RunnerError> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let whole = caps.get(0).expect("group 0 always matches");
            let value = self.value(&caps[1]).ok_or_else(|| {
                RunnerError::Template(format!("unknown placeholder '{}' in '{}'", whole.as_str(), template))
            })?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
        }
        out.push_str(&template[last..]);

        Ok(out)
    }
}
