//! Integration tests for the `trail` CLI.
//!
//! Each test creates a temp directory with a config, a catalog and a route
//! file, runs `trail` as a subprocess, and verifies stdout and/or the store.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn trail_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trail"))
}

/// Create a config, a five-task catalog and an importable route.
fn create_test_dir(root: &Path) {
    fs::write(
        root.join("trail.toml"),
        r#"profile = "tester"
catalog = "catalog.json"

[list]
batch_size = 2
"#,
    )
    .unwrap();

    fs::write(
        root.join("catalog.json"),
        r#"{
  "taskType": "LEAGUE_5",
  "name": "Leagues V",
  "tasks": [
    {"id": 1, "name": "Chop a tree", "description": "Any tree", "tier": "easy", "points": 10},
    {"id": 2, "name": "Light a fire", "description": "Any logs", "tier": "easy", "points": 10},
    {"id": 3, "name": "Cook a shrimp", "description": "On a fire", "tier": "medium", "points": 30},
    {"id": 4, "name": "Bury a bone", "description": "Any bone", "tier": "easy", "points": 10},
    {"id": 5, "name": "Kill a goblin", "description": "Any goblin", "tier": "hard", "points": 80}
  ]
}"#,
    )
    .unwrap();

    // Legacy section form: flat taskIds with a null entry
    fs::write(
        root.join("route.json"),
        r#"{
  "name": "Fast",
  "taskType": "LEAGUE_5",
  "author": "tester",
  "sections": [
    {"name": "Lumbridge", "description": "start here", "taskIds": [1, null, 2]},
    {"name": "Draynor", "items": [{"taskId": 3}, {"customItem": {"id": "bank0001", "type": "bank"}}]}
  ]
}"#,
    )
    .unwrap();
}

/// Run `trail` with the given args against `dir`, returning (stdout, stderr, success).
fn run_trail(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(trail_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run trail");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `trail` expecting success, return stdout.
fn run_trail_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_trail(dir, args);
    if !success {
        panic!(
            "trail {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn store_json(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join("trail-store.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn import_and_activate(dir: &Path) {
    run_trail_ok(dir, &["route", "import", "route.json", "--activate"]);
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn test_list_without_route() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    let out = run_trail_ok(tmp.path(), &["list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("Chop a tree"));
    assert!(lines[4].contains("Kill a goblin"));
}

#[test]
fn test_list_sorted_descending() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    let out = run_trail_ok(tmp.path(), &["list", "--sort", "points", "--desc"]);
    let first = out.lines().next().unwrap();
    assert!(first.contains("Kill a goblin"));
}

#[test]
fn test_list_text_filter() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    let out = run_trail_ok(tmp.path(), &["list", "--text", "FIRE"]);
    assert!(out.contains("Light a fire"));
    assert!(out.contains("Cook a shrimp")); // description matches
    assert!(!out.contains("Chop a tree"));
}

#[test]
fn test_list_empty_message() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    let out = run_trail_ok(tmp.path(), &["list", "--completed", "complete"]);
    assert_eq!(out.trim(), "No tasks match the current filters.");
}

#[test]
fn test_list_json_with_route() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let out = run_trail_ok(tmp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["route"], "Fast");
    assert_eq!(parsed["catalog"], "LEAGUE_5");
    let rows = parsed["rows"].as_array().unwrap();
    let kinds: Vec<&str> = rows.iter().map(|r| r["row"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["header", "task", "task", "header", "task", "placeholder"]
    );
    assert_eq!(rows[0]["section"], "Lumbridge");
    assert_eq!(rows[0]["total"], 2);
    assert_eq!(rows[5]["name"], "Bank");
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[test]
fn test_route_import_upgrades_legacy_sections() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let store = store_json(tmp.path());
    let raw = store["taskstracker.profile.tester.routes-tab1-LEAGUE_5"]
        .as_str()
        .unwrap();
    let routes: serde_json::Value = serde_json::from_str(raw).unwrap();
    let section = &routes[0]["sections"][0];
    assert!(section.get("taskIds").is_none());
    assert_eq!(section["items"].as_array().unwrap().len(), 2);
    assert_eq!(
        store["taskstracker.profile.tester.activeRoute-tab1-LEAGUE_5"],
        "Fast"
    );
}

#[test]
fn test_route_list_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let out = run_trail_ok(tmp.path(), &["route", "list"]);
    assert!(out.contains("* Fast (2 sections, 3 tasks)"));

    let out = run_trail_ok(tmp.path(), &["route", "show", "Fast"]);
    assert!(out.contains("Lumbridge - start here"));
    assert!(out.contains("Cook a shrimp"));
    assert!(out.contains("Bank (bank0001)"));
}

#[test]
fn test_route_export_round_trips_through_import() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let exported = run_trail_ok(tmp.path(), &["route", "export", "Fast"]);
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value["taskType"], "LEAGUE_5");
    assert_eq!(value["sections"][1]["items"][1]["customItem"]["type"], "bank");

    run_trail_ok(tmp.path(), &["route", "remove", "Fast"]);
    fs::write(tmp.path().join("exported.json"), &exported).unwrap();
    run_trail_ok(tmp.path(), &["route", "import", "exported.json"]);
    let again = run_trail_ok(tmp.path(), &["route", "export", "Fast"]);
    assert_eq!(exported, again);
}

#[test]
fn test_route_remove_clears_active_pointer() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    run_trail_ok(tmp.path(), &["route", "remove", "Fast"]);
    let out = run_trail_ok(tmp.path(), &["route", "list"]);
    assert!(out.contains("no routes"));

    let (_, stderr, success) = run_trail(tmp.path(), &["route", "remove", "Fast"]);
    assert!(!success);
    assert!(stderr.contains("no route named 'Fast'"));
}

#[test]
fn test_route_import_rejects_other_task_type() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    fs::write(
        tmp.path().join("other.json"),
        r#"{"name": "Other", "taskType": "COMBAT", "sections": []}"#,
    )
    .unwrap();

    let (_, stderr, success) = run_trail(tmp.path(), &["route", "import", "other.json"]);
    assert!(!success);
    assert!(stderr.contains("COMBAT"));
}

// ---------------------------------------------------------------------------
// Placeholders, tasks and collapse
// ---------------------------------------------------------------------------

#[test]
fn test_placeholder_insert_done_remove() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let id = run_trail_ok(tmp.path(), &["placeholder", "insert", "1", "fairy_ring", "--before"]);
    let id = id.trim().to_string();
    assert_eq!(id.len(), 8);

    let out = run_trail_ok(tmp.path(), &["list"]);
    let lumbridge: Vec<&str> = out.lines().skip(1).take(2).collect();
    assert!(lumbridge[0].contains("Fairy Ring"));
    assert!(lumbridge[1].contains("Chop a tree"));

    run_trail_ok(tmp.path(), &["placeholder", "done", &id]);
    let out = run_trail_ok(tmp.path(), &["list", "--completed", "incomplete"]);
    assert!(!out.contains("Fairy Ring"));

    run_trail_ok(tmp.path(), &["placeholder", "remove", &id]);
    let out = run_trail_ok(tmp.path(), &["route", "show", "Fast"]);
    assert!(!out.contains(&id));
}

#[test]
fn test_placeholder_requires_active_route() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    let (_, stderr, success) = run_trail(tmp.path(), &["placeholder", "insert", "1"]);
    assert!(!success);
    assert!(stderr.contains("no active route"));
}

#[test]
fn test_task_complete_updates_header_counts() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let out = run_trail_ok(tmp.path(), &["task", "complete", "1"]);
    assert!(out.starts_with("[x]"));

    let out = run_trail_ok(tmp.path(), &["list"]);
    assert!(out.lines().next().unwrap().ends_with("[1/2]"));

    let store = store_json(tmp.path());
    let blob: serde_json::Value = serde_json::from_str(
        store["taskstracker.profile.tester.tasks-LEAGUE_5"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert!(blob["1"]["completedOn"].as_i64().unwrap() > 0);
}

#[test]
fn test_task_tag_filter_is_saved_per_tab() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());

    run_trail_ok(tmp.path(), &["task", "tag", "4", "add", "prayer"]);
    let out = run_trail_ok(tmp.path(), &["list", "--tag", "prayer"]);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("Bury a bone"));

    // The saved tag filter keeps applying on this tab only.
    let out = run_trail_ok(tmp.path(), &["list"]);
    assert_eq!(out.lines().count(), 1);
    let out = run_trail_ok(tmp.path(), &["--tab", "tab2", "list"]);
    assert_eq!(out.lines().count(), 5);
}

#[test]
fn test_collapse_persists() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_dir(tmp.path());
    import_and_activate(tmp.path());

    let out = run_trail_ok(tmp.path(), &["collapse", "Lumbridge"]);
    assert_eq!(out.trim(), "collapsed Lumbridge");

    let out = run_trail_ok(tmp.path(), &["list"]);
    assert!(out.lines().next().unwrap().starts_with("+ Lumbridge"));
    assert!(!out.contains("Chop a tree"));

    let out = run_trail_ok(tmp.path(), &["collapse", "Lumbridge"]);
    assert_eq!(out.trim(), "expanded Lumbridge");
    let out = run_trail_ok(tmp.path(), &["list"]);
    assert!(out.contains("Chop a tree"));
}

#[test]
fn test_missing_catalog_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("trail.toml"), "profile = \"x\"\n").unwrap();

    let (_, stderr, success) = run_trail(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("error: no catalog configured"));
}
