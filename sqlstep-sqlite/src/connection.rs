//! SQLite connection implementing the migration seam.

use async_trait::async_trait;
use sqlstep_migrate::{DatabaseResult, MigrationDatabase};
use tokio_rusqlite::Connection;
use tracing::{debug, trace};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};

/// One SQLite connection owned by a migration section.
pub struct SqliteDatabase {
    conn: Connection,
    config: SqliteConfig,
}

impl SqliteDatabase {
    /// Open the database described by `dsn` and verify it answers.
    pub async fn connect(dsn: &str) -> SqliteResult<Self> {
        Self::open(SqliteConfig::from_url(dsn)?).await
    }

    /// Open a database from an explicit configuration.
    pub async fn open(config: SqliteConfig) -> SqliteResult<Self> {
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory().await,
            DatabasePath::File(path) => Connection::open(path).await,
        }
        .map_err(|e| SqliteError::connection(e.to_string()))?;

        let init = config.init_sql();
        conn.call(move |conn| {
            conn.execute_batch(&init)?;
            Ok(())
        })
        .await?;

        let db = Self { conn, config };
        db.ping().await?;
        debug!(path = ?db.config.path, "Opened SQLite database");
        Ok(db)
    }

    /// The configuration this connection was opened with.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> SqliteResult<()> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
            .map_err(|e| SqliteError::connection(e.to_string()))
    }

    async fn batch(&self, sql: &str) -> SqliteResult<()> {
        let sql = sql.to_string();
        trace!(sql = %sql, "Executing batch");
        self.conn
            .call(move |conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await
            .map_err(SqliteError::from)
    }

    async fn query_versions(&self, sql: &str) -> SqliteResult<Vec<u64>> {
        let sql = sql.to_string();
        trace!(sql = %sql, "Fetching versions");
        let raw = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
                let values: Result<Vec<i64>, _> = rows.collect();
                Ok(values?)
            })
            .await?;

        raw.into_iter()
            .map(|v| u64::try_from(v).map_err(|_| SqliteError::InvalidVersion(v)))
            .collect()
    }
}

#[async_trait]
impl MigrationDatabase for SqliteDatabase {
    async fn fetch_versions(&mut self, sql: &str) -> DatabaseResult<Vec<u64>> {
        Ok(self.query_versions(sql).await?)
    }

    async fn execute_batch(&mut self, sql: &str) -> DatabaseResult<()> {
        Ok(self.batch(sql).await?)
    }

    async fn begin(&mut self) -> DatabaseResult<()> {
        Ok(self.batch("BEGIN").await?)
    }

    async fn commit(&mut self) -> DatabaseResult<()> {
        Ok(self.batch("COMMIT").await?)
    }

    async fn rollback(&mut self) -> DatabaseResult<()> {
        Ok(self.batch("ROLLBACK").await?)
    }
}

#[cfg(test)]
mod tests {
    use sqlstep_migrate::DatabaseError;

    use super::*;

    #[tokio::test]
    async fn test_open_memory() {
        let db = SqliteDatabase::connect(":memory:").await.unwrap();
        assert!(db.config().path.is_memory());
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_versions() {
        let mut db = SqliteDatabase::connect(":memory:").await.unwrap();
        db.execute_batch("CREATE TABLE v (version INTEGER); INSERT INTO v VALUES (2), (1);")
            .await
            .unwrap();

        let versions = db
            .fetch_versions("SELECT version FROM v ORDER BY version ASC;")
            .await
            .unwrap();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_missing_table_is_classified() {
        let mut db = SqliteDatabase::connect(":memory:").await.unwrap();
        let err = db
            .fetch_versions("SELECT version FROM nowhere;")
            .await
            .unwrap_err();
        assert!(err.is_missing_table());
    }

    #[tokio::test]
    async fn test_negative_version_rejected() {
        let mut db = SqliteDatabase::connect(":memory:").await.unwrap();
        db.execute_batch("CREATE TABLE v (version INTEGER); INSERT INTO v VALUES (-1);")
            .await
            .unwrap();

        let err = db.fetch_versions("SELECT version FROM v;").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[tokio::test]
    async fn test_rollback_discards_batch() {
        let mut db = SqliteDatabase::connect(":memory:").await.unwrap();
        db.execute_batch("CREATE TABLE v (version INTEGER);").await.unwrap();

        db.begin().await.unwrap();
        db.execute_batch("INSERT INTO v VALUES (1);").await.unwrap();
        db.rollback().await.unwrap();

        let versions = db.fetch_versions("SELECT version FROM v;").await.unwrap();
        assert!(versions.is_empty());
    }
}
