//! Filesystem conventions shared by the detection and metrics runs.
//!
//! Detection writes `{results}/{dataset}/{model}_{variant}/predictions.jsonl`
//! and metrics reads it back, so both sides must build paths here.

use std::path::{Component, Path, PathBuf};
use crate::catalog::Variant;
use crate::error::RunnerError;

/// File name of the predictions artifact inside each result directory
pub const PREDICTIONS_FILE: &str = "predictions.jsonl";

/// Checks that `directory` names an existing directory.
pub fn ensure_directory(directory: &Path) -> Result<(), RunnerError> {
    if directory.is_dir() {
        Ok(())
    } else {
        Err(RunnerError::DirectoryNotFound(directory.to_path_buf()))
    }
}

/// Last non-empty segment of `directory`, so `a/b/mydata/` gives `mydata`.
///
/// `.` and `..` are resolved against the filesystem since they would
/// otherwise escape the results directory. Names that are not valid UTF-8
/// are rejected rather than lossily converted, so two distinct directories
/// never share a results namespace.
pub fn dataset_name(directory: &Path) -> Result<String, RunnerError> {
    let invalid = || RunnerError::InvalidDatasetName(directory.display().to_string());

    let name = match directory.components().last() {
        Some(Component::Normal(name)) => name.to_os_string(),
        Some(Component::CurDir) | Some(Component::ParentDir) => directory
            .canonicalize()?
            .file_name()
            .ok_or_else(invalid)?
            .to_os_string(),
        _ => return Err(invalid()),
    };

    name.into_string().map_err(|_| invalid())
}

/// Directory holding the artifacts of one (model, variant) run.
pub fn result_dir(results_dir: &Path, dataset: &str, model: &str, variant: &Variant) -> PathBuf {
    results_dir
        .join(dataset)
        .join(format!("{}_{}", model, variant.label()))
}

/// Predictions artifact of one (model, variant) run.
pub fn build_result_path(results_dir: &Path, dataset: &str, model: &str, variant: &Variant) -> PathBuf {
    result_dir(results_dir, dataset, model, variant).join(PREDICTIONS_FILE)
}

/// Ground truth file expected inside the dataset directory.
pub fn ground_truths_path(directory: &Path, file_name: &str) -> PathBuf {
    directory.join(file_name)
}

/// Where the JSON summary of a batch is written.
pub fn summary_path(results_dir: &Path, dataset: &str, tool: &str) -> PathBuf {
    results_dir.join(dataset).join(format!("{}_summary.json", tool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_name_last_segment() {
        assert_eq!(dataset_name(Path::new("a/b/c/mydata")).unwrap(), "mydata");
        assert_eq!(dataset_name(Path::new("a/b/c/mydata/")).unwrap(), "mydata");
        assert_eq!(dataset_name(Path::new("a//b//mydata//")).unwrap(), "mydata");
        assert_eq!(dataset_name(Path::new("coco128")).unwrap(), "coco128");
        assert_eq!(dataset_name(Path::new("/data/coco128")).unwrap(), "coco128");
    }

    #[test]
    fn test_dataset_name_without_segments() {
        let err = dataset_name(Path::new("")).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidDatasetName(_)));
        assert!(dataset_name(Path::new("/")).is_err());
    }

    #[test]
    fn test_dataset_name_resolves_dot() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("coco128");
        std::fs::create_dir(&nested).unwrap();

        assert_eq!(dataset_name(&nested.join(".")).unwrap(), "coco128");
        // `sub` does not exist, so `..` cannot be resolved
        assert!(dataset_name(&nested.join("sub/..")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dataset_name_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let first = Path::new("datasets").join(OsStr::from_bytes(b"data\xff"));
        let second = Path::new("datasets").join(OsStr::from_bytes(b"data\xfe"));

        assert!(matches!(dataset_name(&first), Err(RunnerError::InvalidDatasetName(_))));
        assert!(matches!(dataset_name(&second), Err(RunnerError::InvalidDatasetName(_))));
    }

    #[test]
    fn test_native_result_path() {
        let path = build_result_path(
            Path::new("results"),
            "coco128",
            "yolov5s",
            &Variant::native("torch"),
        );
        assert_eq!(path, PathBuf::from("results/coco128/yolov5s_torch/predictions.jsonl"));
    }

    #[test]
    fn test_quantized_result_path() {
        let path = build_result_path(
            Path::new("results"),
            "coco128",
            "yolov5x",
            &Variant::quantized("tflite", "fp16"),
        );
        assert_eq!(path, PathBuf::from("results/coco128/yolov5x_tflite_fp16/predictions.jsonl"));
    }

    #[test]
    fn test_ground_truths_and_summary() {
        assert_eq!(
            ground_truths_path(Path::new("datasets/coco128"), "ground_truths.jsonl"),
            PathBuf::from("datasets/coco128/ground_truths.jsonl")
        );
        assert_eq!(
            summary_path(Path::new("results"), "coco128", "metrics"),
            PathBuf::from("results/coco128/metrics_summary.json")
        );
    }

    #[test]
    fn test_ensure_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_directory(dir.path()).is_ok());

        let file = dir.path().join("ground_truths.jsonl");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(ensure_directory(&file), Err(RunnerError::DirectoryNotFound(_))));
        assert!(ensure_directory(&dir.path().join("missing")).is_err());
    }
}
