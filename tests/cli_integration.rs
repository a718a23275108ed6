use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GenAI workloads"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    // No subcommand should show error/help
    cmd.assert().failure();
}

#[test]
fn test_cli_status_runs() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("status");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Telemetry Status"));
}

#[test]
fn test_cli_status_json() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.args(["status", "--format", "json"]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed.get("app_name").is_some());
    assert!(parsed.get("logging").is_some());
}

#[test]
fn test_cli_demo_dry_run() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.args(["demo", "--dry-run"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]"))
        .stdout(predicate::str::contains("app_name"));
}

#[test]
fn test_cli_demo_runs_full_telemetry_init() {
    // No --dry-run: telemetry::init installs the tracing subscriber and
    // its log bridge, which must coexist with the CLI logging setup.
    // No model endpoint is configured, so the offline generator answers.
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("demo");
    cmd.env_remove("LLMWATCH_API_KEY");
    cmd.env_remove("OPENAI_API_KEY");
    cmd.timeout(std::time::Duration::from_secs(60));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1. Place:"))
        .stdout(predicate::str::contains("3. Plot:"));
}

#[test]
fn test_cli_upload_disabled_goes_to_dev_null() {
    // Image uploading is off by default, so the noop uploader answers.
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("picture.png");
    std::fs::write(&image_path, b"not really a png").unwrap();

    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("upload").arg(image_path.to_str().unwrap());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("/dev/null"));
}

#[test]
fn test_cli_upload_missing_file_fails() {
    let mut cmd = Command::cargo_bin("llmwatch").unwrap();
    cmd.arg("upload").arg("/nonexistent/image.png");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read image file"));
}
