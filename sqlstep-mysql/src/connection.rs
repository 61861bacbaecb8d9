//! MySQL connection implementing the migration seam.

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};
use sqlstep_migrate::{DatabaseResult, MigrationDatabase};
use tracing::{debug, trace};

use crate::config::MysqlConfig;
use crate::error::{MysqlError, MysqlResult};

/// One MySQL session owned by a migration section.
///
/// Multi-statement batches are enabled by the client protocol. DDL commits
/// implicitly on MySQL, so only data changes are undone by a rollback.
pub struct MysqlDatabase {
    conn: Conn,
}

impl MysqlDatabase {
    /// Connect with a URL or TCP DSN and verify the session answers.
    pub async fn connect(dsn: &str) -> MysqlResult<Self> {
        Self::open(&MysqlConfig::from_dsn(dsn)?).await
    }

    /// Connect with an explicit configuration.
    pub async fn open(config: &MysqlConfig) -> MysqlResult<Self> {
        let conn = Conn::new(config.to_opts_builder())
            .await
            .map_err(|e| MysqlError::connection(e.to_string()))?;

        let mut db = Self { conn };
        db.ping().await?;
        debug!(host = %config.host, database = %config.database, "Connected to MySQL");
        Ok(db)
    }

    /// Round-trip a ping packet.
    pub async fn ping(&mut self) -> MysqlResult<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| MysqlError::connection(e.to_string()))
    }

    /// Close the session.
    pub async fn close(self) -> MysqlResult<()> {
        self.conn.disconnect().await?;
        Ok(())
    }

    async fn query_versions(&mut self, sql: &str) -> MysqlResult<Vec<u64>> {
        trace!(sql = %sql, "Fetching versions");
        let rows: Vec<Row> = self.conn.query(sql).await?;

        rows.into_iter()
            .map(|row| match row.get_opt::<u64, _>(0) {
                Some(Ok(version)) => Ok(version),
                other => Err(MysqlError::InvalidVersion(format!("{:?}", other))),
            })
            .collect()
    }

    async fn batch(&mut self, sql: &str) -> MysqlResult<()> {
        trace!(sql = %sql, "Executing batch");
        self.conn.query_drop(sql).await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationDatabase for MysqlDatabase {
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
