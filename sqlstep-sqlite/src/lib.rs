//! SQLite backend for the sqlstep migration engine.
//!
//! This crate implements [`sqlstep_migrate::MigrationDatabase`] over a single
//! `tokio-rusqlite` connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlstep_sqlite::SqliteDatabase;
//!
//! let mut db = SqliteDatabase::connect("sqlite://./app.db").await?;
//! migration.run(&mut db, Operation::Up, |_| {}).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;

pub use config::{DatabasePath, SqliteConfig};
pub use connection::SqliteDatabase;
pub use error::{SqliteError, SqliteResult};
