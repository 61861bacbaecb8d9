//! CLI error types and result alias.

use miette::Diagnostic;
use sqlstep_migrate::MigrationError;
use thiserror::Error;

use crate::env::EnvError;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(sqlstep::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(sqlstep::config), help("check the section in your sqlstep.toml"))]
    Config(String),

    /// Migration error
    #[error(transparent)]
    #[diagnostic(code(sqlstep::migration))]
    Migration(#[from] MigrationError),

    /// Database connection error
    #[error("Database error: {0}")]
    #[diagnostic(code(sqlstep::database))]
    Database(String),

    /// One or more sections failed; later sections still ran
    #[error("{} section(s) failed: {}", .0.len(), .0.join(", "))]
    #[diagnostic(code(sqlstep::sections))]
    SectionsFailed(Vec<String>),

    /// A failed migration could not be rolled back; nothing after it ran
    #[error("Fatal: {0}")]
    #[diagnostic(
        code(sqlstep::rollback),
        help("the database may hold a partially applied migration; inspect it before retrying")
    )]
    RollbackFault(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RollbackFault(_) => 2,
            Self::Migration(e) if e.is_fatal() => 2,
            _ => 1,
        }
    }

    /// Whether no further section may run.
    pub fn is_fatal(&self) -> bool {
        self.exit_code() == 2
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        CliError::Config(err.to_string())
    }
}
