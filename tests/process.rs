#![cfg(unix)]

use indicatif::ProgressBar;
use detbench::catalog::Catalog;
use detbench::config::Settings;
use detbench::runner::{BatchRunner, JobStatus};
use detbench::tools::{Invocation, Launcher, ProcessLauncher, ToolConfig, ToolKind};

fn small_settings(root: &std::path::Path, program: &str) -> Settings {
    let mut settings = Settings::default();
    settings.runner.results_dir = root.join("results");
    settings.catalog = Catalog {
        models: vec!["yolov5s".to_string(), "yolov5m".to_string()],
        frameworks: vec!["torch".to_string()],
        quantizations: vec!["fp16".to_string()],
        quantized_framework: "tflite".to_string(),
    };
    settings.tools.detect = ToolConfig {
        program: program.to_string(),
        args: vec!["{model}".to_string(), "{framework}".to_string()],
        quantized_args: vec!["{quantize}".to_string()],
    };
    settings
}

#[tokio::test]
async fn test_process_launcher_exit_codes() {
    let pb = ProgressBar::hidden();
    let ok = ProcessLauncher
        .launch(&Invocation { program: "true".to_string(), args: Vec::new() }, &pb)
        .await
        .unwrap();
    assert!(ok.success());

    let failed = ProcessLauncher
        .launch(&Invocation { program: "false".to_string(), args: Vec::new() }, &pb)
        .await
        .unwrap();
    assert_eq!(failed.code, Some(1));

    let missing = ProcessLauncher
        .launch(
            &Invocation {
                program: "detbench-no-such-program".to_string(),
                args: Vec::new(),
            },
            &pb,
        )
        .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_child_output_is_relayed() {
    let script = "for i in 1 2 3; do echo line $i; echo warn $i >&2; done; printf tail; exit 3";
    let invocation = Invocation {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    };

    // Relaying drains both pipes, so the exit code is still seen
    let exit = ProcessLauncher.launch(&invocation, &ProgressBar::hidden()).await.unwrap();
    assert_eq!(exit.code, Some(3));
}

#[tokio::test]
async fn test_batch_with_real_processes() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("coco128");
    std::fs::create_dir(&dir).unwrap();

    let runner = BatchRunner::new(small_settings(root.path(), "true"), ProcessLauncher)
        .with_progress(false);
    let report = runner.run(ToolKind::Detect, &dir).await.unwrap();
    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded(), 4);

    let runner = BatchRunner::new(small_settings(root.path(), "false"), ProcessLauncher)
        .with_progress(false);
    let report = runner.run(ToolKind::Detect, &dir).await.unwrap();
    assert_eq!(report.failed(), 4);
}

#[tokio::test]
async fn test_unspawnable_tool_is_recorded() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("coco128");
    std::fs::create_dir(&dir).unwrap();

    let runner = BatchRunner::new(
        small_settings(root.path(), "detbench-no-such-program"),
        ProcessLauncher,
    )
    .with_progress(false);
    let report = runner.run(ToolKind::Detect, &dir).await.unwrap();

    assert_eq!(report.failed(), 4);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.status, JobStatus::SpawnFailed { .. })));
}
