//! PostgreSQL backend for the sqlstep migration engine.
//!
//! This crate implements [`sqlstep_migrate::MigrationDatabase`] over a single
//! `tokio-postgres` session. Both URL and `key=value` connection strings are
//! accepted.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlstep_postgres::PgDatabase;
//!
//! let mut db = PgDatabase::connect("postgres://postgres@localhost/app?sslmode=disable").await?;
//! migration.run(&mut db, Operation::Up, |_| {}).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;

pub use config::{PgConfig, SslMode};
pub use connection::PgDatabase;
pub use error::{PgError, PgResult};
