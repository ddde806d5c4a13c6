use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

fn seeded_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    common::write_log(
        temp.path(),
        "alpha/usage.jsonl",
        &[
            common::entry_line("2025-06-01T08:00:00Z", 300, 100, Some(("m1", "r1"))),
            common::entry_line("2025-06-01T09:00:00Z", 200, 100, Some(("m2", "r2"))),
        ],
    )
    .unwrap();
    temp
}

#[test]
fn test_stats_json_output() {
    let root = seeded_root();

    Command::cargo_bin("claude-monitor")
        .unwrap()
        .env("CLAUDE_MONITOR_DATA_DIR", root.path())
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalTokens\": 700"))
        .stdout(predicate::str::contains("\"sessionCount\": 1"));
}

#[test]
fn test_sessions_human_output() {
    let root = seeded_root();

    Command::cargo_bin("claude-monitor")
        .unwrap()
        .env("CLAUDE_MONITOR_DATA_DIR", root.path())
        .env("NO_COLOR", "1")
        .args(["sessions", "--plan", "pro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-06-01 08:00"))
        .stdout(predicate::str::contains("44.0K"));
}

#[test]
fn test_projects_json_lists_project_share() {
    let root = seeded_root();

    Command::cargo_bin("claude-monitor")
        .unwrap()
        .env("CLAUDE_MONITOR_DATA_DIR", root.path())
        .args(["projects", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"projectPath\": \"alpha\""))
        .stdout(predicate::str::contains("\"percentage\": 100.0"));
}

#[test]
fn test_empty_data_dir_is_not_an_error() {
    let root = TempDir::new().unwrap();

    Command::cargo_bin("claude-monitor")
        .unwrap()
        .env("CLAUDE_MONITOR_DATA_DIR", root.path())
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No usage sessions found"));
}

#[test]
fn test_watch_rejects_json() {
    let root = TempDir::new().unwrap();

    Command::cargo_bin("claude-monitor")
        .unwrap()
        .env("CLAUDE_MONITOR_DATA_DIR", root.path())
        .args(["watch", "--json"])
        .assert()
        .failure();
}
