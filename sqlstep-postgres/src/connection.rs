//! PostgreSQL connection implementing the migration seam.

use async_trait::async_trait;
use sqlstep_migrate::{DatabaseResult, MigrationDatabase};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, trace, warn};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult};

/// One PostgreSQL session owned by a migration section.
///
/// The protocol driver runs on a spawned task that is aborted on drop.
pub struct PgDatabase {
    client: Client,
    driver: JoinHandle<()>,
}

impl PgDatabase {
    /// Connect with a URL or `key=value` DSN and verify the session answers.
    pub async fn connect(dsn: &str) -> PgResult<Self> {
        Self::open(&PgConfig::from_dsn(dsn)?).await
    }

    /// Connect with an explicit configuration.
    pub async fn open(config: &PgConfig) -> PgResult<Self> {
        let (client, connection) = config
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| PgError::connection(e.to_string()))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        let db = Self { client, driver };
        db.ping().await?;
        debug!(host = %config.host, database = %config.database, "Connected to PostgreSQL");
        Ok(db)
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> PgResult<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| PgError::connection(e.to_string()))?;
        Ok(())
    }

    async fn query_versions(&self, sql: &str) -> PgResult<Vec<u64>> {
        trace!(sql = %sql, "Fetching versions");
        let messages = self.client.simple_query(sql).await?;

        let mut versions = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let raw = row.get(0).unwrap_or_default();
                let version = raw
                    .parse()
                    .map_err(|_| PgError::InvalidVersion(raw.to_string()))?;
                versions.push(version);
            }
        }
        Ok(versions)
    }

    async fn batch(&self, sql: &str) -> PgResult<()> {
        trace!(sql = %sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}

impl Drop for PgDatabase {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl MigrationDatabase for PgDatabase {
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
