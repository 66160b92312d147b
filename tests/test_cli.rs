use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_log-focus")
}

fn run(settings: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .arg("--color")
        .arg("never")
        .arg("--settings")
        .arg(settings)
        .args(args)
        .env_remove("LOG_FOCUS_CONFIG")
        .env_remove("LOG_FOCUS_LOG")
        .output()
        .expect("command should run")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn read_settings(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("settings file should exist");
    serde_json::from_str(&raw).expect("settings should be JSON")
}

fn id_at(value: &Value) -> String {
    value["id"].as_str().expect("id string").to_string()
}

/// Create a selected project with one "levels" group holding an ERROR
/// filter. Returns the group id.
fn setup_project(settings: &Path) -> String {
    assert_success(&run(settings, &["project", "add", "app"]));
    let project_id = id_at(&read_settings(settings)["projects"][0]);
    assert_success(&run(settings, &["project", "select", &project_id]));

    assert_success(&run(settings, &["group", "add", "levels"]));
    let group_id = id_at(&read_settings(settings)["projects"][0]["groups"][0]);
    assert_success(&run(settings, &["filter", "add", &group_id, "ERROR"]));
    group_id
}

#[test]
fn test_commands_persist_to_settings_file() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");
    setup_project(&settings);

    let saved = read_settings(&settings);
    let project = &saved["projects"][0];
    assert_eq!(project["name"], "app");
    assert_eq!(project["selected"], true);
    let filter = &project["groups"][0]["filters"][0];
    assert_eq!(filter["regex"], "ERROR");
    assert_eq!(filter["isHighlighted"], true);
    assert!(filter["color"].as_str().unwrap().starts_with("hsl("));
}

#[test]
fn test_view_prints_counts() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");
    let log = dir.path().join("app.log");
    fs::write(&log, "a ERROR x\nb WARN y\nc ERROR z\n").expect("write log");
    setup_project(&settings);

    let output = run(&settings, &["view", log.to_str().expect("utf8 path")]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("     1: a ERROR x"), "stdout:\n{stdout}");
    assert!(stdout.contains("     2: b WARN y"), "stdout:\n{stdout}");
    assert!(stdout.contains("/ERROR/"), "stdout:\n{stdout}");
    assert!(stdout.contains(" 2 "), "stdout:\n{stdout}");
}

#[test]
fn test_focus_prints_marker_and_shown_lines() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");
    let log = dir.path().join("app.log");
    fs::write(&log, "a ERROR x\nb WARN y\nc ERROR z").expect("write log");
    setup_project(&settings);

    let output = run(&settings, &["focus", log.to_str().expect("utf8 path")]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(">>>>>>>focus mode<<<<<<<"), "stdout:\n{stdout}");
    assert!(stdout.contains("     1: a ERROR x"), "stdout:\n{stdout}");
    assert!(stdout.contains("     2: c ERROR z"), "stdout:\n{stdout}");
    assert!(!stdout.contains("WARN"), "stdout:\n{stdout}");
}

#[test]
fn test_invalid_regex_fails_without_saving() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");
    let group_id = setup_project(&settings);

    let output = run(&settings, &["filter", "add", &group_id, "(oops"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

    let saved = read_settings(&settings);
    let filters = saved["projects"][0]["groups"][0]["filters"]
        .as_array()
        .expect("filters array");
    assert_eq!(filters.len(), 1);
}

#[test]
fn test_group_add_without_project_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");

    let output = run(&settings, &["group", "add", "levels"]);
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("You need to add a project first!")
    );
}

#[test]
fn test_tree_prints_group_and_filter_rows() {
    let dir = tempdir().expect("temp dir");
    let settings = dir.path().join("projects.json");
    let log = dir.path().join("app.log");
    fs::write(&log, "ERROR\nERROR\n").expect("write log");
    setup_project(&settings);

    let output = run(&settings, &["tree", log.to_str().expect("utf8 path")]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[bracket-dot] levels"), "stdout:\n{stdout}");
    assert!(stdout.contains("/ERROR/ · 2"), "stdout:\n{stdout}");
    assert!(stdout.contains("f-lit-visible"), "stdout:\n{stdout}");
}
