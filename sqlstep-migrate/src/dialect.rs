//! Backend-specific SQL for the bookkeeping table.
//!
//! Every backend answers the same five questions; adding one means adding a
//! [`Dialect`] variant and its `match` arms here, nothing else.

use std::fmt;
use std::str::FromStr;

/// SQL templates for a version table.
pub trait VersionSql {
    /// `CREATE TABLE IF NOT EXISTS` for the bookkeeping table.
    fn create_table(&self) -> String;

    /// Select the highest applied version (zero or one row).
    fn fetch_current(&self) -> String;

    /// Select every applied version in ascending order.
    fn fetch_all(&self) -> String;

    /// Record a version as applied.
    fn insert_applied(&self, version: u64) -> String;

    /// Forget an applied version.
    fn delete_applied(&self, version: u64) -> String;
}

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// PostgreSQL
    Postgres,
    /// MySQL / MariaDB
    MySql,
    /// SQLite
    Sqlite,
}

impl Dialect {
    /// Look up a dialect by its configured driver name.
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Canonical driver name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Bind this dialect to a table name.
    pub fn table(self, table: impl Into<String>) -> VersionTable {
        VersionTable {
            dialect: self,
            table: table.into(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_driver(s).ok_or_else(|| format!("driver does not exist: {}", s))
    }
}

/// A bookkeeping table on a specific backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    dialect: Dialect,
    table: String,
}

impl VersionTable {
    /// The backend this table lives on.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.table
    }
}

impl VersionSql for VersionTable {
    fn create_table(&self) -> String {
        match self.dialect {
            Dialect::Postgres => format!(
                "CREATE TABLE IF NOT EXISTS {} (applied_version BIGSERIAL PRIMARY KEY, created_at timestamp with time zone NOT NULL DEFAULT now());",
                self.table
            ),
            Dialect::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {} (applied_version bigint(20) unsigned NOT NULL AUTO_INCREMENT, created_at datetime NOT NULL DEFAULT CURRENT_TIMESTAMP, PRIMARY KEY (applied_version)) ENGINE=InnoDB;",
                self.table
            ),
            Dialect::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {} (applied_version INTEGER PRIMARY KEY AUTOINCREMENT, created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP);",
                self.table
            ),
        }
    }

    fn fetch_current(&self) -> String {
        format!(
            "SELECT applied_version FROM {} ORDER BY applied_version DESC LIMIT 1;",
            self.table
        )
    }

    fn fetch_all(&self) -> String {
        format!(
            "SELECT applied_version FROM {} ORDER BY applied_version ASC;",
            self.table
        )
    }

    fn insert_applied(&self, version: u64) -> String {
        format!(
            "INSERT INTO {} (applied_version) VALUES ({});",
            self.table, version
        )
    }

    fn delete_applied(&self, version: u64) -> String {
        format!(
            "DELETE FROM {} WHERE applied_version = {};",
            self.table, version
        )
    }
}
