//! Opens the driver selected by a section's dialect.

use sqlstep_migrate::{Dialect, MigrationDatabase};

use crate::error::{CliError, CliResult};

/// An open connection for one section.
pub enum Connection {
    /// PostgreSQL session.
    #[cfg(feature = "postgres")]
    Postgres(sqlstep_postgres::PgDatabase),
    /// MySQL session.
    #[cfg(feature = "mysql")]
    Mysql(sqlstep_mysql::MysqlDatabase),
    /// SQLite database.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlstep_sqlite::SqliteDatabase),
}

impl Connection {
    /// Connect with the driver for `dialect`.
    pub async fn open(dialect: Dialect, dsn: &str) -> CliResult<Self> {
        if dsn.trim().is_empty() {
            return Err(CliError::Config("dsn is not set".to_string()));
        }
        tracing::debug!(driver = %dialect, "Opening connection");

        match dialect {
            #[cfg(feature = "postgres")]
            Dialect::Postgres => sqlstep_postgres::PgDatabase::connect(dsn)
                .await
                .map(Self::Postgres)
                .map_err(|e| CliError::Database(e.to_string())),
            #[cfg(feature = "mysql")]
            Dialect::MySql => sqlstep_mysql::MysqlDatabase::connect(dsn)
                .await
                .map(Self::Mysql)
                .map_err(|e| CliError::Database(e.to_string())),
            #[cfg(feature = "sqlite")]
            Dialect::Sqlite => sqlstep_sqlite::SqliteDatabase::connect(dsn)
                .await
                .map(Self::Sqlite)
                .map_err(|e| CliError::Database(e.to_string())),
            #[allow(unreachable_patterns)]
            other => Err(CliError::Config(format!(
                "driver {} is not enabled in this build",
                other
            ))),
        }
    }

    /// The connection as the engine sees it.
    pub fn database(&mut self) -> &mut dyn MigrationDatabase {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(db) => db,
            #[cfg(feature = "mysql")]
            Self::Mysql(db) => db,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(db) => db,
        }
    }

    /// Release the connection.
    pub async fn close(self) {
        match self {
            #[cfg(feature = "mysql")]
            Self::Mysql(db) => {
                if let Err(e) = db.close().await {
                    tracing::warn!(error = %e, "Failed to close MySQL connection");
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
}
