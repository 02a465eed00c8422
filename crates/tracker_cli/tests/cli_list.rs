use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tracker-{nanos}-{file_name}"))
}

fn task(
    id: &str,
    title: &str,
    priority: u8,
    status: &str,
    (start, end): (String, String),
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "start_time": start,
        "end_time": end,
        "priority": priority,
        "status": status,
        "created_at": "2025-02-28T12:00:00Z"
    })
}

/// Expands `DDTHH` day/hour pairs into March 2025 RFC 3339 timestamps.
fn window(start: &str, end: &str) -> (String, String) {
    (format!("2025-03-{start}:00:00Z"), format!("2025-03-{end}:00:00Z"))
}

fn write_store(path: &Path) {
    let tasks = vec![
        task("task-1", "late start", 2, "pending", window("03T09", "03T10")),
        task("task-2", "finished early", 1, "finished", window("01T09", "05T12")),
        task("task-3", "first pending", 2, "pending", window("02T09", "04T10")),
        task("task-4", "low priority", 5, "finished", window("02T09", "02T11")),
    ];
    let content = serde_json::json!({ "schema_version": 1, "tasks": tasks });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &Path, config_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracker"))
        .args(args)
        .env("TRACKER_STORE_PATH", store_path)
        .env("TRACKER_CONFIG_PATH", config_path)
        .output()
        .expect("failed to run list command")
}

fn listed_ids(output: &Output) -> Vec<String> {
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    parsed
        .as_array()
        .expect("json array")
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn list_defaults_to_all_tasks_by_start_time() {
    let store_path = temp_path("cli-list-all.json");
    write_store(&store_path);

    let output = run(&store_path, &temp_path("no-config.json"), &["--json", "list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["task-2", "task-3", "task-4", "task-1"]);
}

#[test]
fn list_filters_by_status_and_priority() {
    let store_path = temp_path("cli-list-filter.json");
    write_store(&store_path);

    let output = run(
        &store_path,
        &temp_path("no-config.json"),
        &["--json", "list", "--status", "pending", "--priority", "2", "--sort", "endTime"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["task-1", "task-3"]);
}

#[test]
fn list_plain_text_renders_table() {
    let store_path = temp_path("cli-list-plain.json");
    write_store(&store_path);

    let output = run(
        &store_path,
        &temp_path("no-config.json"),
        &["list", "--status", "finished"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("finished early"));
    assert!(stdout.contains("low priority"));
    assert!(!stdout.contains("first pending"));
    assert!(stdout.contains("2025-03-01 09:00 UTC"));
}

#[test]
fn list_reports_empty_result() {
    let store_path = temp_path("cli-list-empty.json");
    write_store(&store_path);

    let output = run(
        &store_path,
        &temp_path("no-config.json"),
        &["list", "--status", "pending", "--priority", "5"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks found matching the current filters"));
}

#[test]
fn list_uses_config_defaults_and_overrides() {
    let store_path = temp_path("cli-list-config.json");
    let config_path = temp_path("cli-list-config-file.json");
    write_store(&store_path);
    std::fs::write(
        &config_path,
        r#"{ "default_status": "finished", "default_sort": "endTime" }"#,
    )
    .unwrap();

    let from_config = run(&store_path, &config_path, &["--json", "list"]);
    let overridden = run(
        &store_path,
        &config_path,
        &["--json", "--config-override", "status=pending", "list"],
    );
    let flag_wins = run(
        &store_path,
        &config_path,
        &["--json", "list", "--status", "all", "--sort", "start"],
    );
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&config_path).ok();

    assert_eq!(listed_ids(&from_config), vec!["task-4", "task-2"]);
    assert_eq!(listed_ids(&overridden), vec!["task-1", "task-3"]);
    assert_eq!(
        listed_ids(&flag_wins),
        vec!["task-2", "task-3", "task-4", "task-1"]
    );
}

#[test]
fn list_rejects_invalid_config_override() {
    let store_path = temp_path("cli-list-bad-override.json");
    write_store(&store_path);

    let output = run(
        &store_path,
        &temp_path("no-config.json"),
        &["--config-override", "sort=title", "list"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn list_reports_unreadable_config_once_and_uses_defaults() {
    let store_path = temp_path("cli-list-broken-config.json");
    let config_path = temp_path("cli-list-broken-config-file.json");
    write_store(&store_path);
    std::fs::write(&config_path, "{ not json").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tracker"))
        .args(["--json", "list"])
        .env("TRACKER_STORE_PATH", &store_path)
        .env("TRACKER_CONFIG_PATH", &config_path)
        .env_remove("TRACKER_LOG")
        .output()
        .expect("failed to run list command");
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    assert_eq!(listed_ids(&output), vec!["task-2", "task-3", "task-4", "task-1"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("invalid JSON").count(), 1);
    assert!(!stderr.contains("WARNING"));
}
