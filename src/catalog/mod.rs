mod types;
mod catalog;

pub use types::{Job, Variant};
pub use catalog::{Catalog, DEFAULT_FRAMEWORKS, DEFAULT_MODELS, DEFAULT_QUANTIZATIONS, DEFAULT_QUANTIZED_FRAMEWORK};
