//! Live PostgreSQL tests. They run only when `SQLSTEP_TEST_POSTGRES_DSN` is set.

use std::fs;

use sqlstep_migrate::{Migration, MigrationConfig, MigrationDatabase, Operation, VersionSql};
use sqlstep_postgres::PgDatabase;
use tempfile::TempDir;

async fn connect() -> Option<PgDatabase> {
    let dsn = std::env::var("SQLSTEP_TEST_POSTGRES_DSN").ok()?;
    Some(PgDatabase::connect(&dsn).await.unwrap())
}

#[tokio::test]
async fn test_missing_table_then_round_trip() {
    let Some(mut db) = connect().await else {
        return;
    };
    db.execute_batch("DROP TABLE IF EXISTS sqlstep_test_versions; DROP TABLE IF EXISTS sqlstep_test_users;")
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("001_users.sql"),
        "-- @migrate.up\nCREATE TABLE sqlstep_test_users (id BIGINT PRIMARY KEY);\n-- @migrate.down\nDROP TABLE sqlstep_test_users;\n",
    )
    .unwrap();

    let config = MigrationConfig::new("pg")
        .driver("postgres")
        .source_dir(dir.path())
        .version_table("sqlstep_test_versions");

    let mut m = Migration::new(config.clone()).unwrap();
    m.parse().await.unwrap();
    m.run(&mut db, Operation::Status, |_| {}).await.unwrap();
    assert!(m.status().table_missing);

    let outcome = m.run(&mut db, Operation::Up, |_| {}).await.unwrap();
    assert_eq!(outcome.applied, 1);
    let applied = db
        .fetch_versions(&m.version_table().fetch_all())
        .await
        .unwrap();
    assert_eq!(applied, vec![1]);

    let mut m = Migration::new(config).unwrap();
    m.parse().await.unwrap();
    let outcome = m.run(&mut db, Operation::Down, |_| {}).await.unwrap();
    assert_eq!(outcome.applied, 1);

    db.execute_batch("DROP TABLE sqlstep_test_versions;").await.unwrap();
}

#[tokio::test]
async fn test_failed_statement_rolls_back() {
    let Some(mut db) = connect().await else {
        return;
    };
    db.execute_batch("DROP TABLE IF EXISTS sqlstep_test_partial;").await.unwrap();

    db.begin().await.unwrap();
    let err = db
        .execute_batch("CREATE TABLE sqlstep_test_partial (id INT); SELECT * FROM sqlstep_test_nowhere;")
        .await
        .unwrap_err();
    assert!(err.is_missing_table());
    db.rollback().await.unwrap();

    let exists = db
        .fetch_versions("SELECT count(*) FROM information_schema.tables WHERE table_name = 'sqlstep_test_partial';")
        .await
        .unwrap();
    assert_eq!(exists, vec![0]);
}
