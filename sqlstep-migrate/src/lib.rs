//! # sqlstep-migrate
//!
//! Migration engine for sqlstep.
//!
//! This crate provides functionality for:
//! - Discovering versioned `.sql` sources and splitting them into up/down bodies
//! - Generating bookkeeping-table SQL for PostgreSQL, MySQL and SQLite
//! - Reconciling sources against the versions recorded in the database
//! - Applying and rolling back sources, one transaction per source
//! - Rendering statuses and results as text or JSON
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ SourceLoader │────▶│   reconcile    │────▶│  Executor   │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                              ▲                     │
//!                              │                     ▼
//!                      ┌────────────────┐     ┌─────────────┐
//!                      │  VersionTable  │     │   display   │
//!                      └────────────────┘     └─────────────┘
//! ```
//!
//! The engine talks to the database only through [`MigrationDatabase`], which
//! driver crates implement over a single connection.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlstep_migrate::{Migration, MigrationConfig, Operation, display};
//!
//! async fn up(db: &mut dyn sqlstep_migrate::MigrationDatabase) -> sqlstep_migrate::MigrateResult<()> {
//!     let config = MigrationConfig::new("main")
//!         .driver("postgres")
//!         .source_dir("./migrations");
//!
//!     let mut migration = Migration::new(config)?;
//!     migration.parse().await?;
//!
//!     let outcome = migration
//!         .run(db, Operation::Up, |source| {
//!             println!("{}", display::source_line("main", source));
//!         })
//!         .await?;
//!
//!     println!(
//!         "{}",
//!         display::render_apply(&migration, Operation::Up, &outcome, display::OutputFormat::Text)
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Source Files
//!
//! ```text
//! migrations/
//! ├── 0001_create_users.sql
//! └── 0002_add_posts.sql
//! ```
//!
//! ```sql
//! -- @migrate.up
//! CREATE TABLE users (id BIGINT PRIMARY KEY);
//!
//! -- @migrate.down
//! DROP TABLE users;
//! ```

pub mod database;
pub mod dialect;
pub mod display;
pub mod engine;
pub mod error;
pub mod source;
pub mod status;

// Re-exports
pub use database::{DatabaseError, DatabaseResult, MigrationDatabase};
pub use dialect::{Dialect, VersionSql, VersionTable};
pub use display::{OutputFormat, Severity};
pub use engine::{
    ApplyOutcome, DEFAULT_VERSION_TABLE, Migration, MigrationConfig, Operation,
};
pub use error::{MigrateResult, MigrationError};
pub use source::{
    Annotations, CaptureMode, DEFAULT_DOWN_ANNOTATION, DEFAULT_UP_ANNOTATION, Source,
    SourceLoader, version_from_filename, write_template,
};
pub use status::{Status, reconcile};
