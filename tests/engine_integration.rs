//! Integration tests for the umbrella crate.
//!
//! These run the engine through the re-exported paths against SQLite.

#![cfg(feature = "sqlite")]

use std::fs;

use pretty_assertions::assert_eq;
use sqlstep::migrate::display;
use sqlstep::prelude::*;
use sqlstep::sqlite::SqliteDatabase;
use tempfile::TempDir;

#[tokio::test]
async fn test_up_and_json_report() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("20240101120000_users.sql"),
        "-- @migrate.up\nCREATE TABLE users (id INTEGER PRIMARY KEY);\n-- @migrate.down\nDROP TABLE users;\n",
    )
    .unwrap();

    let config = MigrationConfig::new("main")
        .driver("sqlite")
        .source_dir(dir.path())
        .json(true);
    let mut migration = Migration::new(config).unwrap();
    migration.parse().await.unwrap();

    let mut db = SqliteDatabase::connect(":memory:").await.unwrap();
    let outcome = migration.run(&mut db, Operation::Up, |_| {}).await.unwrap();
    assert_eq!(outcome.applied, 1);

    let record = display::render_apply(&migration, Operation::Up, &outcome, OutputFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert_eq!(value["current"], 0);
    assert_eq!(value["sources"][0]["version"], 20240101120000u64);
    assert_eq!(value["sources"][0]["applied"], true);
    assert_eq!(value["severity"], "INFO");
}

#[tokio::test]
async fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("init.sql"), "-- @migrate.up\nSELECT 1;\n").unwrap();

    let config = MigrationConfig::new("main").driver("sqlite").source_dir(dir.path());
    let mut migration = Migration::new(config).unwrap();
    let err = migration.parse().await.unwrap_err();

    assert!(matches!(err, MigrationError::Parse { .. }));
    assert!(err.to_string().contains("init.sql"));
}
