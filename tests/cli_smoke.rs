use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// Helper to get a Command for the `codestash` binary rooted at `dir`.
// The token path is pinned inside the temp dir so tests never see a real login.
fn codestash(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codestash").expect("binary exists");
    cmd.current_dir(dir.path())
        .env("CODESTASH_TOKEN_PATH", dir.path().join("token.json"))
        .env("CODESTASH_API_BASE_URL", "http://127.0.0.1:9")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(dir.path());
    cmd
}

fn init(dir: &TempDir, context: &str, collection: &str, folder: &str) {
    codestash(dir)
        .args([
            "init",
            "--folder",
            folder,
            "--collection",
            collection,
            "--context",
            context,
        ])
        .assert()
        .success();
}

fn read_state(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.path().join(".codestash").join("state.json"))
        .expect("state file should exist");
    serde_json::from_str(&raw).expect("state file should be valid JSON")
}

fn write_state(dir: &TempDir, value: serde_json::Value) {
    let path = dir.path().join(".codestash").join("state.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, value.to_string()).unwrap();
}

// -----------------------------------------------------------------------
// Basic CLI
// -----------------------------------------------------------------------

#[test]
fn help_shows_description() {
    Command::cargo_bin("codestash")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stash code snippets"));
}

#[test]
fn version_shows_semver() {
    Command::cargo_bin("codestash")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn no_args_shows_usage() {
    Command::cargo_bin("codestash")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// -----------------------------------------------------------------------
// Init
// -----------------------------------------------------------------------

#[test]
fn init_writes_state_document() {
    let dir = TempDir::new().unwrap();
    codestash(&dir)
        .args(["init", "--folder", "f1", "--collection", "c1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized context \"default\""));

    let state = read_state(&dir);
    assert_eq!(state["current_context"], "default");
    assert_eq!(state["current_scope"], "folder");
    assert_eq!(state["contexts"]["default"]["collection"], "c1");
    assert_eq!(state["contexts"]["default"]["folder"], "f1");
}

#[test]
fn init_requires_folder_flag() {
    let dir = TempDir::new().unwrap();
    codestash(&dir)
        .args(["init", "--collection", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--folder"));
}

#[test]
fn init_rejects_blank_collection() {
    let dir = TempDir::new().unwrap();
    codestash(&dir)
        .args(["init", "--folder", "f1", "--collection", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collection id is required"));
    assert!(!dir.path().join(".codestash").exists());
}

// -----------------------------------------------------------------------
// Context
// -----------------------------------------------------------------------

#[test]
fn context_list_marks_current() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");
    init(&dir, "home", "c2", "f2");

    codestash(&dir)
        .args(["context", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* home (collection: c2, folder: f2)"))
        .stdout(predicate::str::contains("  work (collection: c1, folder: f1)"));
}

#[test]
fn context_list_without_contexts_hints_init() {
    let dir = TempDir::new().unwrap();
    codestash(&dir)
        .args(["context", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No contexts defined"));
}

#[test]
fn context_switch_changes_current() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");
    init(&dir, "home", "c2", "f2");

    codestash(&dir)
        .args(["context", "switch", "work"])
        .assert()
        .success();
    assert_eq!(read_state(&dir)["current_context"], "work");
}

#[test]
fn context_switch_unknown_fails() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");
    let before = read_state(&dir);

    codestash(&dir)
        .args(["context", "switch", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    assert_eq!(read_state(&dir), before);
}

#[test]
fn context_switch_refused_in_note_scope() {
    let dir = TempDir::new().unwrap();
    write_state(
        &dir,
        serde_json::json!({
            "contexts": {
                "work": {"name": "work", "collection": "c1", "folder": "f1"},
                "home": {"name": "home", "collection": "c2", "folder": "f2"}
            },
            "current_context": "work",
            "current_scope": "note",
            "current_note": "n1",
            "files": {}
        }),
    );

    codestash(&dir)
        .args(["context", "switch", "home"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("folder scope"));
}

// -----------------------------------------------------------------------
// Status and note scope
// -----------------------------------------------------------------------

#[test]
fn status_without_context_fails() {
    let dir = TempDir::new().unwrap();
    codestash(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active context"));
}

#[test]
fn status_shows_folder_scope() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");

    codestash(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Context: work (collection: c1, folder: f1)",
        ))
        .stdout(predicate::str::contains("Scope: folder"))
        .stdout(predicate::str::contains("Note: <none>"))
        .stdout(predicate::str::contains("Login: <none>"));
}

#[test]
fn status_shows_active_note_and_exit_leaves_it() {
    let dir = TempDir::new().unwrap();
    write_state(
        &dir,
        serde_json::json!({
            "contexts": {"work": {"name": "work", "collection": "c1", "folder": "f1"}},
            "current_context": "work",
            "current_scope": "note",
            "current_note": "n1",
            "current_note_title": "Greeting",
            "files": {}
        }),
    );

    codestash(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scope: note"))
        .stdout(predicate::str::contains("Note: Greeting (n1)"))
        .stdout(predicate::str::contains("Login: <none>"));

    codestash(&dir)
        .args(["note", "exit"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exited note scope"));

    let state = read_state(&dir);
    assert_eq!(state["current_scope"], "folder");
    assert!(state.get("current_note").is_none());

    codestash(&dir)
        .args(["note", "exit"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Already in folder scope"));
}

#[test]
fn status_shows_stored_login() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");
    std::fs::write(
        dir.path().join("token.json"),
        serde_json::json!({
            "access_token": "tok",
            "scope": ["notes:read"],
            "expires_at": "2999-01-01T00:00:00Z"
        })
        .to_string(),
    )
    .unwrap();

    codestash(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Login: active until 2999-01-01"));
}

#[test]
fn malformed_state_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".codestash").join("state.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ broken").unwrap();

    codestash(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load state"));
}

// -----------------------------------------------------------------------
// Notes: local preconditions are checked before any network call
// -----------------------------------------------------------------------

#[test]
fn notes_list_requires_login() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");

    codestash(&dir)
        .args(["notes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn notes_update_requires_note_scope() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");
    std::fs::write(dir.path().join("main.go"), "package main").unwrap();

    codestash(&dir)
        .args(["notes", "update", "--file", "main.go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in note scope"));
}

#[test]
fn notes_create_requires_readable_file() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");

    codestash(&dir)
        .args(["notes", "create", "--file", "missing.go", "--title", "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read file"));
}

#[test]
fn note_switch_requires_login() {
    let dir = TempDir::new().unwrap();
    init(&dir, "work", "c1", "f1");

    codestash(&dir)
        .args(["note", "switch", "n1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}
