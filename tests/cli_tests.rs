//! CLI-level tests for the vexport binary

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn vexport() -> Command {
    Command::cargo_bin("vexport").expect("binary builds")
}

/// Write a minimal clipless project to a temp file
fn write_project() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"fps":{{"num":30,"den":1}},"width":1280,"height":720,
           "sample_rate":48000,"channels":2,"channel_layout":3,"clips":[]}}"#
    )
    .unwrap();
    file
}

#[test]
fn test_missing_required_arguments() {
    vexport()
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--project"));
}

#[test]
fn test_missing_project_file_exits_with_load_code() {
    vexport()
        .args([
            "export",
            "--project",
            "/nonexistent/project.json",
            "--outfile",
            "/tmp/out.mp4",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_inspect_reports_single_frame_range_for_empty_project() {
    let project = write_project();
    vexport()
        .args(["inspect", "--project", project.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export range: [1, 1]"));
}

#[test]
fn test_inspect_json_output() {
    let project = write_project();
    vexport()
        .args([
            "inspect",
            "--project",
            project.path().to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"frame_count\": 1"));
}

#[test]
fn test_trailing_arguments_are_ignored() {
    // Extra arguments after the required flags are accepted; the command
    // still fails on the missing project, not on argument parsing
    vexport()
        .args([
            "export",
            "--project",
            "/nonexistent/project.json",
            "--outfile",
            "/tmp/out.mp4",
            "leftover",
            "arguments",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_bad_config_file_rejected() {
    let project = write_project();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, "[video]\nnot_a_key = true\n").unwrap();

    vexport()
        .args([
            "export",
            "--project",
            project.path().to_str().unwrap(),
            "--outfile",
            "/tmp/out.mp4",
            "--config",
            config.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1);
}
