use std::fmt;
use serde::Serialize;

/// How a model is executed: a native framework, or the quantized
/// mobile framework at a given precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variant {
    /// A framework run at its native precision (torch, onnx_vino, ...)
    Native { framework: String },
    /// The quantized framework (tflite) at a precision level (fp32, fp16, ...)
    Quantized { framework: String, quantization: String },
}

impl Variant {
    pub fn native(framework: impl Into<String>) -> Self {
        Variant::Native { framework: framework.into() }
    }

    pub fn quantized(framework: impl Into<String>, quantization: impl Into<String>) -> Self {
        Variant::Quantized {
            framework: framework.into(),
            quantization: quantization.into(),
        }
    }

    /// Framework identifier passed to the tools.
    pub fn framework(&self) -> &str {
        match self {
            Variant::Native { framework } => framework,
            Variant::Quantized { framework, .. } => framework,
        }
    }

    /// Quantization level, only set for quantized variants.
    pub fn quantization(&self) -> Option<&str> {
        match self {
            Variant::Native { .. } => None,
            Variant::Quantized { quantization, .. } => Some(quantization),
        }
    }

    /// Suffix used in result directory names: `torch` or `tflite_fp16`.
    pub fn label(&self) -> String {
        match self {
            Variant::Native { framework } => framework.clone(),
            Variant::Quantized { framework, quantization } => {
                format!("{}_{}", framework, quantization)
            }
        }
    }

    pub fn is_quantized(&self) -> bool {
        matches!(self, Variant::Quantized { .. })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One (model, variant) combination of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Job {
    pub model: String,
    pub variant: Variant,
}

impl Job {
    pub fn new(model: impl Into<String>, variant: Variant) -> Self {
        Self { model: model.into(), variant }
    }

    /// Directory name under the dataset results: `{model}_{variant}`.
    pub fn result_key(&self) -> String {
        format!("{}_{}", self.model, self.variant.label())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.result_key())
    }
}
