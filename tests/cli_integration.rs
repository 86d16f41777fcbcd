//! Integration tests for the `dt` CLI.
//!
//! Each test creates a temp notes directory, runs `dt` as a subprocess with
//! an isolated config home, and verifies stdout and/or file contents.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Create a small notes directory: one project, three tasks, one stray file.
fn create_test_notes(dir: &Path) {
    fs::write(
        dir.join("20250101T090000--garden__project.md"),
        "\
---
title: \"Garden\"
identifier: \"20250101T090000\"
project_id: 1
status: active
---
",
    )
    .unwrap();

    fs::write(
        dir.join("20250102T090000--plant-tomatoes__task_garden.md"),
        "\
---
title: \"Plant tomatoes\"
tags:
  - task
  - garden
task_id: 1
status: open
priority: p2
due_date: 2000-01-01
project: \"20250101T090000\"
area: \"home\"
---

Use the raised bed.

---

Seeds are in the shed.
",
    )
    .unwrap();

    fs::write(
        dir.join("20250103T090000--file-taxes__task.md"),
        "\
---
title: \"File taxes\"
task_id: 2
status: done
priority: p1
---
",
    )
    .unwrap();

    fs::write(
        dir.join("20250104T090000--call-plumber__task.md"),
        "\
---
title: \"Call plumber\"
task_id: 3
status: paused
---
",
    )
    .unwrap();

    fs::write(dir.join("20250105T090000--ideas__misc.md"), "not a task\n").unwrap();
    fs::write(dir.join("README.md"), "# my notes\n").unwrap();
}

struct Env {
    notes: TempDir,
    config_home: TempDir,
}

fn setup() -> Env {
    let env = Env {
        notes: TempDir::new().unwrap(),
        config_home: TempDir::new().unwrap(),
    };
    create_test_notes(env.notes.path());
    env
}

/// Run `dt` against the env's notes directory, returning (stdout, stderr, success).
fn run_dt(env: &Env, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_dt"))
        .arg("-C")
        .arg(env.notes.path())
        .args(args)
        .env("XDG_CONFIG_HOME", env.config_home.path())
        .env_remove("DT_LOG")
        .output()
        .expect("failed to run dt");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dt` expecting success, return stdout.
fn run_dt_ok(env: &Env, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_dt(env, args);
    if !success {
        panic!("dt {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

fn task_file(env: &Env, name: &str) -> String {
    fs::read_to_string(env.notes.path().join(name)).unwrap()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn list_shows_only_tasks() {
    let env = setup();
    let out = run_dt_ok(&env, &["list", "--sort", "id"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[ ] 1 p2 Plant tomatoes (due 2000-01-01) #garden",
            "[x] 2 p1 File taxes",
            "[~] 3 Call plumber",
        ]
    );
}

#[test]
fn list_sort_and_reverse() {
    let env = setup();
    let out = run_dt_ok(&env, &["list", "--sort", "priority"]);
    let ids: Vec<&str> = out.lines().map(|l| &l[4..5]).collect();
    assert_eq!(ids, vec!["2", "1", "3"]);

    let out = run_dt_ok(&env, &["list", "--sort", "priority", "--reverse"]);
    let ids: Vec<&str> = out.lines().map(|l| &l[4..5]).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
}

#[test]
fn list_filters() {
    let env = setup();
    let out = run_dt_ok(&env, &["list", "--filter", "overdue"]);
    assert!(out.contains("Plant tomatoes"));
    assert_eq!(out.lines().count(), 1);

    let out = run_dt_ok(&env, &["list", "--filter", "active", "--sort", "id"]);
    assert!(out.contains("Plant tomatoes"));
    assert!(out.contains("Call plumber"));
    assert!(!out.contains("File taxes"));

    let out = run_dt_ok(&env, &["list", "--project", "1"]);
    assert_eq!(out.lines().count(), 1);

    let out = run_dt_ok(&env, &["list", "--area", "work"]);
    assert_eq!(out.trim(), "no tasks");
}

#[test]
fn list_rejects_unknown_filter_and_sort() {
    let env = setup();
    let (_, stderr, success) = run_dt(&env, &["list", "--filter", "someday"]);
    assert!(!success);
    assert!(stderr.contains("unknown filter"));

    let (_, _, success) = run_dt(&env, &["list", "--sort", "alphabetical"]);
    assert!(!success);
}

#[test]
fn list_json() {
    let env = setup();
    let out = run_dt_ok(&env, &["list", "--sort", "id", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["task_id"], 1);
    assert_eq!(arr[0]["project"], "20250101T090000");
    assert_eq!(arr[1]["status"], "done");
}

#[test]
fn show_task() {
    let env = setup();
    let out = run_dt_ok(&env, &["show", "1"]);
    assert!(out.starts_with("1 Plant tomatoes\n"));
    assert!(out.contains("area: home"));

    let (_, stderr, success) = run_dt(&env, &["show", "99"]);
    assert!(!success);
    assert!(stderr.contains("task not found: 99"));
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn status_rewrites_only_the_status_line() {
    let env = setup();
    let name = "20250102T090000--plant-tomatoes__task_garden.md";
    let before = task_file(&env, name);

    let out = run_dt_ok(&env, &["status", "1", "delegated"]);
    assert_eq!(out.trim(), "1 → delegated");
    assert_eq!(
        task_file(&env, name),
        before.replace("status: open", "status: delegated")
    );
}

#[test]
fn invalid_status_is_rejected_without_touching_file() {
    let env = setup();
    let name = "20250102T090000--plant-tomatoes__task_garden.md";
    let before = task_file(&env, name);
    let (_, stderr, success) = run_dt(&env, &["status", "1", "finished"]);
    assert!(!success);
    assert!(stderr.contains("invalid status"));
    assert_eq!(task_file(&env, name), before);
}

#[test]
fn done_shortcut() {
    let env = setup();
    run_dt_ok(&env, &["done", "3"]);
    assert!(task_file(&env, "20250104T090000--call-plumber__task.md").contains("status: done"));
}

#[test]
fn set_fields() {
    let env = setup();
    let name = "20250103T090000--file-taxes__task.md";
    run_dt_ok(&env, &["set", "2", "due", "2025-04-15"]);
    run_dt_ok(&env, &["set", "2", "assignee", "Sam"]);
    run_dt_ok(&env, &["set", "2", "project", "1"]);
    let content = task_file(&env, name);
    assert!(content.contains("due_date: 2025-04-15\n"));
    assert!(content.contains("assignee: Sam\n"));
    assert!(content.contains("project: \"20250101T090000\"\n"));

    let (_, stderr, success) = run_dt(&env, &["set", "2", "estimate", "4"]);
    assert!(!success);
    assert!(stderr.contains("invalid estimate"));
}

#[test]
fn tag_add_remove_set() {
    let env = setup();
    let name = "20250102T090000--plant-tomatoes__task_garden.md";

    let out = run_dt_ok(&env, &["tag", "1", "--add", "outdoor", "--remove", "garden"]);
    assert_eq!(out.trim(), "1 tags: task, outdoor");
    let content = task_file(&env, name);
    assert!(content.contains("area: \"home\"\ntags:\n  - task\n  - outdoor\n---\n"));
    assert!(content.ends_with("---\n\nSeeds are in the shed.\n"));

    let out = run_dt_ok(&env, &["tag", "1", "--set", "task,spring"]);
    assert_eq!(out.trim(), "1 tags: task, spring");
}

#[test]
fn new_task_allocates_next_id() {
    let env = setup();
    let out = run_dt_ok(
        &env,
        &["new", "Buy seeds", "--tag", "shopping", "--priority", "p1", "--project", "1"],
    );
    assert!(out.starts_with("4 "));
    assert!(out.trim().ends_with("__task_shopping.md"));

    let out = run_dt_ok(&env, &["new", "Water plants", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["task_id"], 5);
    assert_eq!(parsed["status"], "open");

    let counter = fs::read_to_string(env.notes.path().join(".task-counter.json")).unwrap();
    assert!(counter.contains("\"next_task_id\":6"));
    assert!(env.notes.path().join(".dt.lock").exists());

    let out = run_dt_ok(&env, &["show", "4"]);
    assert!(out.contains("project: 20250101T090000"));
}

#[test]
fn new_task_rejects_bad_input() {
    let env = setup();
    let (_, stderr, success) = run_dt(&env, &["new", "Bad", "--due", "tomorrow"]);
    assert!(!success);
    assert!(stderr.contains("invalid date"));

    let (_, stderr, success) = run_dt(&env, &["new", "Orphan", "--project", "orchard"]);
    assert!(!success);
    assert!(stderr.contains("project not found"));
}

// ---------------------------------------------------------------------------
// Projects and config
// ---------------------------------------------------------------------------

#[test]
fn project_commands() {
    let env = setup();
    let out = run_dt_ok(&env, &["project", "list"]);
    assert_eq!(out.trim(), "#1 [active] Garden (20250101T090000)");

    let out = run_dt_ok(&env, &["project", "show", "20250101T090000"]);
    assert!(out.contains("Plant tomatoes"));
    assert!(!out.contains("File taxes"));

    let out = run_dt_ok(&env, &["project", "new", "Kitchen remodel"]);
    assert!(out.starts_with("#2 "));

    run_dt_ok(&env, &["project", "status", "1", "completed"]);
    let out = run_dt_ok(&env, &["project", "list", "--filter", "open"]);
    assert!(out.contains("Kitchen remodel"));
    assert!(!out.contains("Garden"));
}

#[test]
fn config_init_and_show() {
    let env = setup();
    let out = run_dt_ok(&env, &["config", "init"]);
    assert!(out.contains("denote-tasks"));
    let path = env.config_home.path().join("denote-tasks/config.toml");
    assert!(path.exists());

    let (_, stderr, success) = run_dt(&env, &["config", "init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));

    let out = run_dt_ok(&env, &["config", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["sort"], "modified");
    assert_eq!(parsed["filter"], "all");
}

#[test]
fn config_sets_default_sort() {
    let env = setup();
    let dir = env.config_home.path().join("denote-tasks");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "sort = \"id\"\nreverse = true\n").unwrap();

    let out = run_dt_ok(&env, &["list"]);
    let ids: Vec<&str> = out.lines().map(|l| &l[4..5]).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
}

#[test]
fn missing_notes_directory_is_an_error() {
    let env = setup();
    let output = Command::new(env!("CARGO_BIN_EXE_dt"))
        .args(["-C", "/definitely/not/here", "list"])
        .env("XDG_CONFIG_HOME", env.config_home.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("notes directory not found"));
}
