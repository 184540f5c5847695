use serde::{Deserialize, Serialize};
use super::types::{Job, Variant};

pub const DEFAULT_MODELS: &[&str] = &["yolov5s", "yolov5m", "yolov5l", "yolov5x"];
pub const DEFAULT_FRAMEWORKS: &[&str] = &["torch", "torch_onnx", "onnx_vino", "onnx_tf", "tf", "tf_onnx"];
pub const DEFAULT_QUANTIZATIONS: &[&str] = &["fp32", "fp16"];
pub const DEFAULT_QUANTIZED_FRAMEWORK: &str = "tflite";

/// The ordered identifier lists a batch is built from.
///
/// Order matters only for the order in which jobs run and are logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Model names, iterated innermost
    pub models: Vec<String>,
    /// Native frameworks, one pass over `models` each
    pub frameworks: Vec<String>,
    /// Precision levels of the quantized framework, one pass over `models` each
    pub quantizations: Vec<String>,
    /// Framework identifier used for quantized runs
    #[serde(default = "default_quantized_framework")]
    pub quantized_framework: String,
}

fn default_quantized_framework() -> String {
    DEFAULT_QUANTIZED_FRAMEWORK.to_string()
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            models: owned(DEFAULT_MODELS),
            frameworks: owned(DEFAULT_FRAMEWORKS),
            quantizations: owned(DEFAULT_QUANTIZATIONS),
            quantized_framework: default_quantized_framework(),
        }
    }
}

impl Catalog {
    /// Expands the catalog into the full job sequence.
    ///
    /// Every framework × model combination comes first (framework outer),
    /// followed by every quantization × model combination (quantization outer).
    pub fn jobs(&self) -> Vec<Job> {
        let native = self.frameworks.iter().flat_map(|framework| {
            self.models
                .iter()
                .map(move |model| Job::new(model.clone(), Variant::native(framework.clone())))
        });

        let quantized = self.quantizations.iter().flat_map(|quantization| {
            self.models.iter().map(move |model| {
                Job::new(
                    model.clone(),
                    Variant::quantized(self.quantized_framework.clone(), quantization.clone()),
                )
            })
        });

        native.chain(quantized).collect()
    }

    /// Number of jobs `jobs()` yields.
    pub fn job_count(&self) -> usize {
        (self.frameworks.len() + self.quantizations.len()) * self.models.len()
    }

    /// Checks the lists are usable as path components and flag values.
    pub fn validate(&self) -> Result<(), String> {
        check_list("models", &self.models)?;
        check_list("frameworks", &self.frameworks)?;
        check_list("quantizations", &self.quantizations)?;
        check_identifier("quantized_framework", &self.quantized_framework)?;
        Ok(())
    }
}

fn check_list(name: &str, values: &[String]) -> Result<(), String> {
    if values.is_empty() {
        return Err(format!("catalog.{} must not be empty", name));
    }
    for (i, value) in values.iter().enumerate() {
        check_identifier(name, value)?;
        if values[..i].contains(value) {
            return Err(format!("catalog.{} contains '{}' more than once", name, value));
        }
    }
    Ok(())
}

fn check_identifier(name: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("catalog.{} contains an empty identifier", name));
    }
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(format!("catalog.{}: '{}' is not a valid identifier", name, value));
    }
    Ok(())
}
