//! Error types for PostgreSQL operations.

use sqlstep_migrate::DatabaseError;
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// A returned value is not a version number.
    #[error("invalid version value: {0}")]
    InvalidVersion(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Check if the server reported `undefined_table` (42P01).
    pub fn is_missing_table(&self) -> bool {
        match self {
            Self::Postgres(e) => e.code() == Some(&SqlState::UNDEFINED_TABLE),
            _ => false,
        }
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Postgres(e) => e.is_closed(),
            _ => false,
        }
    }
}

impl From<PgError> for DatabaseError {
    fn from(err: PgError) -> Self {
        if err.is_missing_table() {
            return DatabaseError::missing_table(err.to_string());
        }
        if err.is_connection_error() {
            return DatabaseError::connection(err.to_string());
        }
        match err {
            // SQLSTATE followed by the server message.
            PgError::Postgres(e) => match e.as_db_error() {
                Some(db) => DatabaseError::query(format!("{}: {}", db.code().code(), db.message())),
                None => DatabaseError::query(e.to_string()),
            },
            other => DatabaseError::query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PgError::config("missing host in URL");
        assert_eq!(err.to_string(), "configuration error: missing host in URL");
    }

    #[test]
    fn test_connection_classification() {
        let err = DatabaseError::from(PgError::connection("refused"));
        assert!(matches!(err, DatabaseError::Connection(_)));
    }

    #[test]
    fn test_invalid_version_is_query_error() {
        let err = DatabaseError::from(PgError::InvalidVersion("abc".into()));
        assert!(matches!(err, DatabaseError::Query(_)));
        assert!(!err.is_missing_table());
    }
}
