//! The connection seam between the engine and a concrete database driver.

use thiserror::Error;

/// Result type for driver calls made by the engine.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors a driver reports back to the engine.
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// The bookkeeping table does not exist yet.
    #[error("table does not exist: {0}")]
    MissingTable(String),

    /// The connection is unusable.
    #[error("connection error: {0}")]
    Connection(String),

    /// Any other statement failure.
    #[error("{0}")]
    Query(String),
}

impl DatabaseError {
    /// Create a missing table error.
    pub fn missing_table(msg: impl Into<String>) -> Self {
        Self::MissingTable(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Check if this error means the bookkeeping table is absent.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::MissingTable(_))
    }
}

/// A single open database connection owned by one section.
///
/// The executor never nests transactions: every `begin` is followed by exactly one
/// `commit` or `rollback` before the next source starts.
#[async_trait::async_trait]
pub trait MigrationDatabase: Send {
    /// Run a query whose first column is an applied version and collect it.
    async fn fetch_versions(&mut self, sql: &str) -> DatabaseResult<Vec<u64>>;

    /// Execute one or more statements as a single batch.
    async fn execute_batch(&mut self, sql: &str) -> DatabaseResult<()>;

    /// Open a transaction.
    async fn begin(&mut self) -> DatabaseResult<()>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> DatabaseResult<()>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> DatabaseResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_detection() {
        assert!(DatabaseError::missing_table("versions").is_missing_table());
        assert!(!DatabaseError::query("syntax error").is_missing_table());
    }

    #[test]
    fn test_query_error_display_is_raw() {
        let err = DatabaseError::query("syntax error at or near \"CREAT\"");
        assert_eq!(err.to_string(), "syntax error at or near \"CREAT\"");
    }
}
