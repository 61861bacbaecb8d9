//! Integration tests for the sqlstep CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the sqlstep binary, run from `dir`
#[allow(deprecated)]
fn sqlstep_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sqlstep").unwrap();
    cmd.current_dir(dir)
        .env_remove("SQLSTEP_CONFIG")
        .env_remove("SQLSTEP_DEBUG")
        .env_remove("SQLSTEP_LOG_LEVEL");
    cmd
}

fn write_source(dir: &Path, name: &str, up: &str, down: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(name),
        format!("-- @migrate.up\n{}\n-- @migrate.down\n{}\n", up, down),
    )
    .unwrap();
}

/// A project with a `main` section backed by `app.db` and two sources.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("sqlstep.toml"),
        r#"
[main]
driver = "sqlite"
dsn = "app.db"
source_dir = "migrations"

[audit]
driver = "sqlite"
dsn = "audit.db"
source_dir = "audit"
version_table = "audit_versions"
"#,
    )
    .unwrap();

    let migrations = dir.path().join("migrations");
    write_source(
        &migrations,
        "001_users.sql",
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );
    write_source(
        &migrations,
        "002_posts.sql",
        "CREATE TABLE posts (id INTEGER PRIMARY KEY);",
        "DROP TABLE posts;",
    );
    write_source(
        &dir.path().join("audit"),
        "001_log.sql",
        "CREATE TABLE log (id INTEGER PRIMARY KEY);",
        "DROP TABLE log;",
    );
    dir
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    sqlstep_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Versioned SQL migrations"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("force-up"))
        .stdout(predicate::str::contains("new"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    sqlstep_cmd(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_status_on_fresh_database() {
    let dir = project();
    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version of main:"))
        .stdout(predicate::str::contains("version table does not exist"))
        .stdout(predicate::str::contains("    unapplied:\n        1 001_users.sql\n        2 002_posts.sql"));
}

#[test]
fn test_up_then_status() {
    let dir = project();
    sqlstep_cmd(dir.path())
        .args(["up", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK 1 to main is 001_users.sql"))
        .stdout(predicate::str::contains("OK 2 to main is 002_posts.sql"))
        .stdout(predicate::str::contains("2 of 2 up migrations applied to main"));

    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    current:\n        2"))
        .stdout(predicate::str::contains("unapplied:").not());

    sqlstep_cmd(dir.path())
        .args(["up", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to migrate in main"));
}

#[test]
fn test_down_reverts_current() {
    let dir = project();
    sqlstep_cmd(dir.path()).args(["up", "main"]).assert().success();

    sqlstep_cmd(dir.path())
        .args(["down", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK 2 to main is 002_posts.sql"))
        .stdout(predicate::str::contains("1 of 1 down migrations applied to main"));

    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    current:\n        1"));
}

#[test]
fn test_multiple_sections_in_order() {
    let dir = project();
    let output = sqlstep_cmd(dir.path())
        .args(["up", "audit", "main"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    let audit = stdout.find("OK 1 to audit is 001_log.sql").unwrap();
    let main = stdout.find("OK 1 to main is 001_users.sql").unwrap();
    assert!(audit < main);
}

#[test]
fn test_json_status() {
    let dir = project();
    sqlstep_cmd(dir.path()).args(["up", "main"]).assert().success();

    let output = sqlstep_cmd(dir.path())
        .args(["--json", "status", "main"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"section\":\"main\""));
    assert!(stdout.contains("\"operation\":\"status\""));
    assert!(stdout.contains("\"current\":2"));
    assert!(stdout.contains("\"severity\":\"INFO\""));
}

#[test]
fn test_failed_section_does_not_stop_later_sections() {
    let dir = project();
    write_source(
        &dir.path().join("migrations"),
        "003_broken.sql",
        "CREATE TABLE tags (id INTEGER);\nINSERT INTO nowhere VALUES (1);",
        "DROP TABLE tags;",
    );

    sqlstep_cmd(dir.path())
        .args(["up", "main", "audit"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("OK 2 to main is 002_posts.sql"))
        .stdout(predicate::str::contains("NG 3 to main is 003_broken.sql"))
        .stdout(predicate::str::contains("2 of 3 up migrations applied to main"))
        .stdout(predicate::str::contains("OK 1 to audit is 001_log.sql"))
        .stderr(predicate::str::contains("Section main:"))
        .stderr(predicate::str::contains("003_broken.sql"))
        .stderr(predicate::str::contains("1 section(s) failed: main"));

    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    current:\n        2"))
        .stdout(predicate::str::contains("3 003_broken.sql"));
}

#[test]
fn test_unknown_section() {
    let dir = project();
    sqlstep_cmd(dir.path())
        .args(["up", "reports"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("section does not exist: reports"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sqlstep.toml"));
}

#[test]
fn test_unsupported_driver() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("custom.toml"),
        "[main]\ndriver = \"oracle\"\ndsn = \"x\"\n",
    )
    .unwrap();

    sqlstep_cmd(dir.path())
        .args(["-c", "custom.toml", "up", "main"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("driver does not exist: oracle"));
}

#[test]
fn test_new_creates_template() {
    let dir = project();
    sqlstep_cmd(dir.path())
        .args(["new", "add_tags", "--section", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_add_tags.sql"));

    let created: Vec<_> = fs::read_dir(dir.path().join("migrations"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with("_add_tags.sql"))
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(
        fs::read_to_string(created[0].path()).unwrap(),
        "-- @migrate.up\n\n\n-- @migrate.down\n\n"
    );
}

#[test]
fn test_force_up_applies_history_gap() {
    let dir = project();
    fs::remove_file(dir.path().join("migrations/001_users.sql")).unwrap();
    sqlstep_cmd(dir.path()).args(["up", "main"]).assert().success();

    write_source(
        &dir.path().join("migrations"),
        "001_users.sql",
        "CREATE TABLE users (id INTEGER PRIMARY KEY);",
        "DROP TABLE users;",
    );

    sqlstep_cmd(dir.path())
        .args(["status", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unapplied version before current:\n        1 001_users.sql"))
        .stderr(predicate::str::contains("unapplied versions before current version 2"));

    sqlstep_cmd(dir.path())
        .args(["force-up", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK 1 to main is 001_users.sql"))
        .stdout(predicate::str::contains("1 of 1 force-up migrations applied to main"));
}
