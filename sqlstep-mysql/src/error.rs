//! Error types for MySQL operations.

use sqlstep_migrate::DatabaseError;
use thiserror::Error;

/// `ER_NO_SUCH_TABLE`.
pub const ER_NO_SUCH_TABLE: u16 = 1146;

/// Result type for MySQL operations.
pub type MysqlResult<T> = Result<T, MysqlError>;

/// Error type for MySQL operations.
#[derive(Debug, Error)]
pub enum MysqlError {
    /// MySQL driver error.
    #[error("mysql error: {0}")]
    Mysql(#[from] mysql_async::Error),

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

impl MysqlError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Server error code, if the server rejected the statement.
    pub fn server_code(&self) -> Option<u16> {
        match self {
            Self::Mysql(mysql_async::Error::Server(e)) => Some(e.code),
            _ => None,
        }
    }

    /// Check if the statement referenced a table that does not exist.
    pub fn is_missing_table(&self) -> bool {
        self.server_code() == Some(ER_NO_SUCH_TABLE)
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Mysql(mysql_async::Error::Io(_))
                | Self::Mysql(mysql_async::Error::Driver(_))
        )
    }
}

impl From<MysqlError> for DatabaseError {
    fn from(err: MysqlError) -> Self {
        if err.is_missing_table() {
            DatabaseError::missing_table(err.to_string())
        } else if err.is_connection_error() {
            DatabaseError::connection(err.to_string())
        } else {
            DatabaseError::query(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use mysql_async::ServerError;

    use super::*;

    fn server_error(code: u16, message: &str) -> MysqlError {
        MysqlError::Mysql(mysql_async::Error::Server(ServerError {
            code,
            message: message.to_string(),
            state: "42S02".to_string(),
        }))
    }

    #[test]
    fn test_missing_table_classification() {
        let err = server_error(ER_NO_SUCH_TABLE, "Table 'app.migration_versions' doesn't exist");
        assert!(err.is_missing_table());
        assert!(DatabaseError::from(err).is_missing_table());
    }

    #[test]
    fn test_syntax_error_is_query_error() {
        let err = DatabaseError::from(server_error(1064, "You have an error in your SQL syntax"));
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[test]
    fn test_connection_classification() {
        let err = DatabaseError::from(MysqlError::connection("refused"));
        assert!(matches!(err, DatabaseError::Connection(_)));
    }
}
