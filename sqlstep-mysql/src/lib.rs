//! MySQL backend for the sqlstep migration engine.
//!
//! This crate implements [`sqlstep_migrate::MigrationDatabase`] over a single
//! `mysql_async` connection. Both `mysql://` URLs and
//! `user:pass@tcp(host:port)/db` DSNs are accepted.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlstep_mysql::MysqlDatabase;
//!
//! let mut db = MysqlDatabase::connect("root:secret@tcp(127.0.0.1:3306)/app").await?;
//! migration.run(&mut db, Operation::Up, |_| {}).await?;
//! db.close().await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;

pub use config::MysqlConfig;
pub use connection::MysqlDatabase;
pub use error::{ER_NO_SUCH_TABLE, MysqlError, MysqlResult};
