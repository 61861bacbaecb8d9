//! Error types for the migration engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::database::DatabaseError;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while parsing, reconciling or applying a section.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Invalid section configuration (unknown section, unsupported driver).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file could not be turned into a versioned migration.
    #[error("Parse error in {}: {message}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database could not be opened or pinged.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The bookkeeping table could not be read.
    #[error("Reconciliation error: {0}")]
    Reconcile(String),

    /// A migration statement failed and was rolled back.
    #[error("Apply error in {}: {message}", path.display())]
    Apply {
        /// Source file whose body failed.
        path: PathBuf,
        /// Database error text.
        message: String,
    },

    /// Rolling back a failed migration failed as well. The database state is unknown.
    #[error(
        "Rollback failed for {}: {rollback} (while recovering from: {apply})",
        path.display()
    )]
    RollbackFault {
        /// Source file whose transaction could not be rolled back.
        path: PathBuf,
        /// The error that triggered the rollback.
        apply: String,
        /// The rollback error.
        rollback: String,
    },
}

impl MigrationError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error for a file.
    pub fn parse(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a reconciliation error.
    pub fn reconcile(msg: impl Into<String>) -> Self {
        Self::Reconcile(msg.into())
    }

    /// Create an apply error attributed to a source file.
    pub fn apply(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Apply {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Whether this error must stop the whole process, not just the current section.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFault { .. })
    }
}

impl From<DatabaseError> for MigrationError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(msg) => Self::Connection(msg),
            other => Self::Reconcile(other.to_string()),
        }
    }
}
