//! Error types for SQLite operations.

use sqlstep_migrate::DatabaseError;
use thiserror::Error;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// SQLite driver error.
    #[error("{0}")]
    Sqlite(#[from] tokio_rusqlite::Error),

    /// A stored version does not fit an unsigned version number.
    #[error("invalid version value: {0}")]
    InvalidVersion(i64),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Check if the statement referenced a table that does not exist.
    pub fn is_missing_table(&self) -> bool {
        match self {
            Self::Sqlite(e) => e.to_string().contains("no such table"),
            _ => false,
        }
    }

    /// Check if the connection itself is gone.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Sqlite(tokio_rusqlite::Error::ConnectionClosed)
        )
    }
}

impl From<rusqlite::Error> for SqliteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(tokio_rusqlite::Error::Rusqlite(err))
    }
}

impl From<SqliteError> for DatabaseError {
    fn from(err: SqliteError) -> Self {
        if err.is_missing_table() {
            DatabaseError::missing_table(err.to_string())
        } else if err.is_connection_error() {
            DatabaseError::connection(err.to_string())
        } else {
            DatabaseError::query(err.to_string())
        }
    }
}
