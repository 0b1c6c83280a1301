use std::path::Path;

use clap::Parser;
use serial_test::serial;
use wellness_report_cli::{Cli, CliError, run};
use wellness_report_core::config::ReportConfig;
use wellness_report_core::{HealthReport, ReportError, ReportIndexEntry};

fn config(data_dir: &Path) -> ReportConfig {
    ReportConfig {
        data_dir: data_dir.to_path_buf(),
        ..ReportConfig::default()
    }
}

async fn exec(data_dir: &Path, args: &[&str]) -> Result<String, CliError> {
    let argv = std::iter::once("wellness-report").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("parse");
    run(cli, config(data_dir)).await
}

#[tokio::test]
async fn generate_then_list_show_and_delete() {
    let dir = tempfile::tempdir().expect("tempdir");

    let generated = exec(dir.path(), &["generate", "--json"]).await.expect("generate");
    let report: HealthReport = serde_json::from_str(&generated).expect("report json");
    assert!(report.domain_snapshots.hydration.is_synthetic());

    let listed = exec(dir.path(), &["list", "--json"]).await.expect("list");
    let entries: Vec<ReportIndexEntry> = serde_json::from_str(&listed).expect("index json");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, report.id);

    let shown = exec(dir.path(), &["show", &report.id]).await.expect("show");
    assert!(shown.starts_with("# Health Report"));
    assert!(shown.contains(&format!("Report ID: {}", report.id)));

    let deleted = exec(dir.path(), &["delete", &report.id]).await.expect("delete");
    assert_eq!(deleted, format!("Deleted report {}", report.id));
    let listed = exec(dir.path(), &["list"]).await.expect("list");
    assert_eq!(listed, "No reports saved.");
}

#[tokio::test]
async fn export_writes_dated_markdown_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("exports");

    let generated = exec(dir.path(), &["generate", "--json"]).await.expect("generate");
    let report: HealthReport = serde_json::from_str(&generated).expect("report json");

    let out_arg = out.to_str().expect("utf-8 path");
    let message = exec(dir.path(), &["export", &report.id, "--dir", out_arg])
        .await
        .expect("export");
    let file = out.join(format!(
        "health_report_{}.md",
        report.created_at.format("%Y-%m-%d")
    ));
    assert!(message.ends_with(&file.display().to_string()));
    let text = std::fs::read_to_string(&file).expect("read export");
    assert!(text.contains("## Overall Recommendations"));
}

#[tokio::test]
async fn failed_save_still_writes_requested_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    // a plain file where the reports directory should be makes every store write fail
    std::fs::write(dir.path().join("reports"), "not a directory").expect("block reports dir");
    let out = dir.path().join("exports");
    let out_arg = out.to_str().expect("utf-8 path");

    let err = exec(dir.path(), &["generate", "--export-dir", out_arg])
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Report(ReportError::Persistence(_))));
    assert_eq!(err.user_message(), "report could not be saved");

    let exported: Vec<_> = std::fs::read_dir(&out)
        .expect("export dir")
        .map(|e| e.expect("entry").file_name().into_string().expect("name"))
        .collect();
    assert_eq!(exported.len(), 1);
    assert!(exported[0].starts_with("health_report_"));
    let text = std::fs::read_to_string(out.join(&exported[0])).expect("read export");
    assert!(text.contains("## Mental Health"));
}

#[tokio::test]
async fn show_unknown_report_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = exec(dir.path(), &["show", "missing-id"]).await.unwrap_err();
    assert!(matches!(err, CliError::Report(ReportError::NotFound(_))));
    assert_eq!(err.user_message(), "report not found");
}

#[tokio::test]
async fn schema_lists_report_properties() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = exec(dir.path(), &["schema"]).await.expect("schema");
    let schema: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert!(schema["properties"].get("derivedScores").is_some());
}

#[tokio::test]
#[serial]
async fn data_dir_comes_from_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    // SAFETY: serialized with the other environment tests
    unsafe {
        std::env::set_var("WELLNESS_REPORT_DATA_DIR", dir.path());
        std::env::set_var("WELLNESS_REPORT_SYNTHETIC", "false");
    }
    let config = ReportConfig::from_env();
    unsafe {
        std::env::remove_var("WELLNESS_REPORT_DATA_DIR");
        std::env::remove_var("WELLNESS_REPORT_SYNTHETIC");
    }
    let config = config.expect("config");
    assert_eq!(config.data_dir, dir.path());
    assert!(!config.synthetic_placeholders);

    let cli = Cli::try_parse_from(["wellness-report", "generate"]).expect("parse");
    let out = run(cli, config).await.expect("generate");
    assert!(out.contains("Overall Wellness: 73/100 (Fair)"));
    assert!(dir.path().join("reports").join("report-index.json").exists());
}

#[tokio::test]
#[serial]
async fn invalid_environment_is_config_error() {
    // SAFETY: serialized with the other environment tests
    unsafe { std::env::set_var("WELLNESS_REPORT_TIMEOUT_SECS", "never") };
    let config = ReportConfig::from_env();
    unsafe { std::env::remove_var("WELLNESS_REPORT_TIMEOUT_SECS") };
    let err = CliError::from(config.unwrap_err());
    assert_eq!(err.user_message(), "configuration is invalid");
}
