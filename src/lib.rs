//! # sqlstep
//!
//! Versioned SQL migrations for PostgreSQL, MySQL and SQLite.
//!
//! sqlstep provides:
//! - Plain `.sql` sources named `<version>_<name>.sql`, with annotated up and down bodies
//! - A bookkeeping table recording every applied version
//! - Detection of unapplied versions older than the current one
//! - One transaction per source, rolled back on failure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sqlstep::prelude::*;
//! use sqlstep::sqlite::SqliteDatabase;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MigrationConfig::new("main")
//!         .driver("sqlite")
//!         .source_dir("migrations");
//!     let mut migration = Migration::new(config)?;
//!     migration.parse().await?;
//!
//!     let mut db = SqliteDatabase::connect("app.db").await?;
//!     migration.run(&mut db, Operation::Up, |_| {}).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The migration engine.
pub mod migrate {
    pub use sqlstep_migrate::*;
}

/// PostgreSQL backend.
#[cfg(feature = "postgres")]
pub mod postgres {
    pub use sqlstep_postgres::*;
}

/// MySQL backend.
#[cfg(feature = "mysql")]
pub mod mysql {
    pub use sqlstep_mysql::*;
}

/// SQLite backend.
#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use sqlstep_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        Migration, MigrationConfig, MigrationDatabase, MigrationError, Operation, OutputFormat,
    };
}

// Re-export key types at the crate root
pub use migrate::{MigrateResult, MigrationError};
