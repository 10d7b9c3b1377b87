//! CLI integration tests for shotline
//!
//! These tests drive the binary against a real workspace, seeding data
//! through the library where the binary has no matching write command.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use shotline::storage::{add_group, add_show, add_unit, open_database, user_password_match};
use shotline::{Category, Group, GroupId, Show, Unit, UnitId};

/// Get a command instance for the shotline binary, isolated from the caller's environment
fn shotline_cmd(config_home: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("shotline"));
    cmd.env_remove("SHOTLINE_DB")
        .env_remove("SHOTLINE_LOG")
        .env_remove("SHOTLINE_PASSWORD")
        .env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

/// Create a temporary directory and initialize a workspace
fn setup_workspace() -> (TempDir, TempDir) {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    shotline_cmd(&home).arg("init").arg(dir.path()).assert().success();
    (dir, home)
}

/// Adds show TEST, group CG and three tagged shots
fn seed(dir: &TempDir) {
    let mut conn = open_database(&dir.path().join(".shotline/shotline.db"), 1000).unwrap();
    add_show(&mut conn, &Show::new("TEST")).unwrap();
    add_group(&mut conn, &Group::new(&GroupId::new("TEST", "CG").unwrap())).unwrap();

    for (name, tags) in [
        ("0030", ["lamp", "window"]),
        ("0010", ["roi", "remove"]),
        ("0020", ["roi", "window"]),
    ] {
        let mut unit = Unit::new(&UnitId::new("TEST", Category::Shot, "CG", name).unwrap());
        unit.tags = tags.iter().map(|t| t.to_string()).collect();
        unit.tasks = vec!["comp".to_string(), "lit".to_string()];
        add_unit(&mut conn, &unit).unwrap();
    }
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    shotline_cmd(&home)
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized shotline workspace"));

    assert!(dir.path().join(".shotline").is_dir());
    assert!(dir.path().join(".shotline/config.toml").is_file());
    assert!(dir.path().join(".shotline/.gitignore").is_file());
    assert!(dir.path().join(".shotline/shotline.db").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let (dir, home) = setup_workspace();

    shotline_cmd(&home).arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_init_uses_site_seed() {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".shotline")).unwrap();
    fs::write(
        dir.path().join(".shotline/config.toml"),
        "[site]\ntasks = [\"fx\", \"comp\"]\n",
    )
    .unwrap();

    shotline_cmd(&home).arg("init").arg(dir.path()).assert().success();

    let conn = open_database(&dir.path().join(".shotline/shotline.db"), 1000).unwrap();
    let site = shotline::storage::get_site(&conn).unwrap();
    assert_eq!(site.tasks, vec!["fx", "comp"]);
}

#[test]
fn test_init_rejects_bad_seed() {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".shotline")).unwrap();
    fs::write(
        dir.path().join(".shotline/config.toml"),
        "[site]\ntasks = [\"fx\"]\ndefault_shot_tasks = [\"paint\"]\n",
    )
    .unwrap();

    shotline_cmd(&home)
        .arg("init")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// =============================================================================
// Inspection Tests
// =============================================================================

#[test]
fn test_status_outside_workspace_fails() {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    shotline_cmd(&home)
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a shotline workspace"));
}

#[test]
fn test_status_counts_rows() {
    let (dir, home) = setup_workspace();
    seed(&dir);

    let out = shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["err"], "");
    assert_eq!(json["msg"]["tables"]["sites"], 1);
    assert_eq!(json["msg"]["tables"]["units"], 3);
    assert_eq!(json["msg"]["tables"]["tasks"], 6);
}

#[test]
fn test_shows_text() {
    let (dir, home) = setup_workspace();

    shotline_cmd(&home)
        .current_dir(dir.path())
        .arg("shows")
        .assert()
        .success()
        .stdout(predicate::str::contains("No shows"));

    seed(&dir);

    shotline_cmd(&home)
        .current_dir(dir.path())
        .arg("shows")
        .assert()
        .success()
        .stdout(predicate::str::contains("TEST"));
}

#[test]
fn test_search_by_tag_json() {
    let (dir, home) = setup_workspace();
    seed(&dir);

    let out = shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["search", "TEST", "--tag", "roi", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let units: Vec<&str> = json["msg"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["unit"].as_str().unwrap())
        .collect();
    assert_eq!(units, vec!["0010", "0020"]);
}

#[test]
fn test_search_text_lists_unit_ids() {
    let (dir, home) = setup_workspace();
    seed(&dir);

    shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["search", "TEST", "-u", "0030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TEST/shot/CG/0030"))
        .stdout(predicate::str::contains("lit,comp"))
        .stdout(predicate::str::contains("Found 1 unit(s)"));
}

#[test]
fn test_search_rejects_unknown_status() {
    let (dir, home) = setup_workspace();

    shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["search", "TEST", "--status", "finished"])
        .assert()
        .failure();
}

#[test]
fn test_search_bad_show_is_json_error() {
    let (dir, home) = setup_workspace();

    let out = shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["--format", "json", "search", "BAD SHOW"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(json["msg"].is_null());
    assert!(!json["err"].as_str().unwrap().is_empty());
}

// =============================================================================
// User Tests
// =============================================================================

#[test]
fn test_add_user_uses_configured_bcrypt_cost() {
    let (dir, home) = setup_workspace();
    let config_path = dir.path().join(".shotline/config.toml");
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, config.replace("bcrypt_cost = 12", "bcrypt_cost = 4")).unwrap();

    shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["add-user", "kybin"])
        .env("SHOTLINE_PASSWORD", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added user kybin"));

    let conn = open_database(&dir.path().join(".shotline/shotline.db"), 1000).unwrap();
    let hash: String = conn
        .query_row(
            "SELECT hashed_password FROM users WHERE userid = 'kybin'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(hash.starts_with("$2b$04$"), "unexpected hash prefix: {}", hash);
    assert!(user_password_match(&conn, "kybin", "secret").unwrap());
}

#[test]
fn test_add_user_rejects_bad_cost() {
    let (dir, home) = setup_workspace();
    let config_path = dir.path().join(".shotline/config.toml");
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, config.replace("bcrypt_cost = 12", "bcrypt_cost = 2")).unwrap();

    shotline_cmd(&home)
        .current_dir(dir.path())
        .args(["add-user", "kybin", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bcrypt_cost"));
}
