//! Migration engine: section configuration, reconciliation against a live
//! database, and the transactional executor.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, error, info, warn};

use crate::database::MigrationDatabase;
use crate::dialect::{Dialect, VersionSql, VersionTable};
use crate::error::{MigrateResult, MigrationError};
use crate::source::{Annotations, Source, SourceLoader};
use crate::status::{Status, reconcile};

/// Default bookkeeping table name.
pub const DEFAULT_VERSION_TABLE: &str = "migration_versions";

/// Configuration for one section.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Section name, used in reports.
    pub section: String,
    /// Driver name (`postgres`, `mysql`, `sqlite`).
    pub driver: String,
    /// Connection string handed to the driver.
    pub dsn: String,
    /// Directories globbed for `*.sql` sources.
    pub source_dirs: Vec<PathBuf>,
    /// Bookkeeping table name.
    pub version_table: String,
    /// Up/down annotation tokens.
    pub annotations: Annotations,
    /// Versions at or below this number are ignored.
    pub version_floor: u64,
    /// Render structured output.
    pub json: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            section: String::new(),
            driver: String::new(),
            dsn: String::new(),
            source_dirs: Vec::new(),
            version_table: DEFAULT_VERSION_TABLE.to_string(),
            annotations: Annotations::default(),
            version_floor: 0,
            json: false,
        }
    }
}

impl MigrationConfig {
    /// Create a configuration for a section.
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            ..Default::default()
        }
    }

    /// Set the driver name.
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Set the connection string.
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = dsn.into();
        self
    }

    /// Add a source directory.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }

    /// Set the bookkeeping table name.
    pub fn version_table(mut self, table: impl Into<String>) -> Self {
        self.version_table = table.into();
        self
    }

    /// Set the annotation tokens.
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Set the version floor.
    pub fn version_floor(mut self, floor: u64) -> Self {
        self.version_floor = floor;
        self
    }

    /// Enable structured output.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// What a run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Apply pending sources newer than the current version.
    Up,
    /// Roll back exactly the current version.
    Down,
    /// Apply every unapplied source, including history gaps.
    ForceUp,
    /// Report only.
    Status,
}

impl Operation {
    /// Command label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::ForceUp => "force-up",
            Self::Status => "status",
        }
    }

    /// Whether this operation may write to the database.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Status)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "force-up" | "force_up" => Ok(Self::ForceUp),
            "status" => Ok(Self::Status),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// Counts from an apply pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Sources in the working set.
    pub selected: usize,
    /// Sources that opened a transaction.
    pub attempted: usize,
    /// Sources committed.
    pub applied: usize,
}

impl ApplyOutcome {
    /// Nothing was selected for this operation.
    pub fn is_noop(&self) -> bool {
        self.selected == 0
    }
}

/// One section: its configuration, parsed sources and the status of the current run.
#[derive(Debug)]
pub struct Migration {
    config: MigrationConfig,
    table: VersionTable,
    sources: Vec<Source>,
    status: Status,
}

impl Migration {
    /// Create a section. Fails when the driver has no SQL dialect.
    pub fn new(config: MigrationConfig) -> MigrateResult<Self> {
        let dialect = Dialect::from_driver(&config.driver).ok_or_else(|| {
            MigrationError::config(format!("driver does not exist: {}", config.driver))
        })?;
        let table = dialect.table(config.version_table.clone());

        Ok(Self {
            config,
            table,
            sources: Vec::new(),
            status: Status::default(),
        })
    }

    /// Section configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Section name.
    pub fn section(&self) -> &str {
        &self.config.section
    }

    /// SQL dialect selected by the driver name.
    pub fn dialect(&self) -> Dialect {
        self.table.dialect()
    }

    /// Bookkeeping table.
    pub fn version_table(&self) -> &VersionTable {
        &self.table
    }

    /// Parsed sources, sorted by version.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Source at an index held by [`Status`].
    pub fn source(&self, index: usize) -> &Source {
        &self.sources[index]
    }

    /// Status of the current run.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Take the apply error recorded by the last run.
    pub fn take_error(&mut self) -> Option<MigrationError> {
        self.status.error.take()
    }

    /// Replace the parsed sources (sorted by version). Clears the status.
    pub fn set_sources(&mut self, mut sources: Vec<Source>) {
        sources.sort_by_key(|s| s.version);
        self.sources = sources;
        self.status = Status::default();
    }

    /// Read and parse every source file.
    pub async fn parse(&mut self) -> MigrateResult<()> {
        let loader = SourceLoader::new(
            self.config.source_dirs.clone(),
            self.config.annotations.clone(),
        );
        self.sources = loader.load().await?;
        self.status = Status::default();
        debug!(
            section = %self.config.section,
            count = self.sources.len(),
            "Loaded migration sources"
        );
        Ok(())
    }

    /// Compute the status against the bookkeeping table.
    ///
    /// A missing table is created, except for [`Operation::Status`] where it is
    /// only reported.
    pub async fn reconcile(
        &mut self,
        db: &mut dyn MigrationDatabase,
        op: Operation,
    ) -> MigrateResult<()> {
        let mut table_missing = false;

        let current = match db.fetch_versions(&self.table.fetch_current()).await {
            Ok(rows) => rows.into_iter().next(),
            Err(e) if e.is_missing_table() => {
                if op.is_mutating() {
                    info!(
                        section = %self.config.section,
                        table = %self.table.name(),
                        "Creating version table"
                    );
                    db.execute_batch(&self.table.create_table())
                        .await
                        .map_err(|e| MigrationError::reconcile(e.to_string()))?;
                } else {
                    warn!(
                        section = %self.config.section,
                        table = %self.table.name(),
                        "Version table does not exist"
                    );
                    table_missing = true;
                }
                None
            }
            Err(e) => return Err(e.into()),
        };

        let applied = if current.is_some() {
            db.fetch_versions(&self.table.fetch_all()).await?
        } else {
            Vec::new()
        };

        self.status = reconcile(
            &mut self.sources,
            self.config.version_floor,
            current,
            &applied,
        );
        self.status.table_missing = table_missing;

        if self.status.has_anomaly() {
            warn!(
                section = %self.config.section,
                current = self.status.current_version,
                count = self.status.before_unapplied.len(),
                "Unapplied versions exist before the current version"
            );
        }
        Ok(())
    }

    /// Indices of the sources `op` would run, in execution order.
    pub fn selection(&self, op: Operation) -> Vec<usize> {
        match op {
            Operation::Up => self.status.after_unapplied.clone(),
            Operation::Down => self.status.current_applied.into_iter().collect(),
            Operation::ForceUp => self
                .status
                .before_unapplied
                .iter()
                .chain(&self.status.after_unapplied)
                .copied()
                .collect(),
            Operation::Status => Vec::new(),
        }
    }

    /// Run the working set for `op`, one transaction per source.
    ///
    /// `on_source` is called as soon as each attempted source succeeds or fails.
    /// The first failure is stored in [`Status::error`] and ends the pass; a
    /// failed rollback is returned as [`MigrationError::RollbackFault`].
    pub async fn apply<F>(
        &mut self,
        db: &mut dyn MigrationDatabase,
        op: Operation,
        mut on_source: F,
    ) -> MigrateResult<ApplyOutcome>
    where
        F: FnMut(&Source),
    {
        let selection = self.selection(op);
        let mut outcome = ApplyOutcome {
            selected: selection.len(),
            ..Default::default()
        };

        if selection.is_empty() {
            info!(section = %self.config.section, op = %op, "Nothing to migrate");
            return Ok(outcome);
        }

        for index in selection {
            let source = &self.sources[index];
            let (body, bookkeeping) = match op {
                Operation::Down => (
                    source.down_sql.as_str(),
                    self.table.delete_applied(source.version),
                ),
                _ => (
                    source.up_sql.as_str(),
                    self.table.insert_applied(source.version),
                ),
            };

            if body.is_empty() {
                debug!(path = %source.path.display(), op = %op, "Skipping empty body");
                continue;
            }

            outcome.attempted += 1;
            self.status.processed.push(index);
            let batch = format!("{}\n{}", body, bookkeeping);

            if let Err(message) = run_transaction(db, &batch).await {
                error!(
                    section = %self.config.section,
                    version = source.version,
                    path = %source.path.display(),
                    error = %message,
                    "Migration failed"
                );
                if let Err(rollback) = db.rollback().await {
                    return Err(MigrationError::RollbackFault {
                        path: source.path.clone(),
                        apply: message,
                        rollback: rollback.to_string(),
                    });
                }
                on_source(source);
                self.status.error = Some(MigrationError::apply(&source.path, message));
                break;
            }

            let source = &mut self.sources[index];
            source.applied = true;
            outcome.applied += 1;
            info!(
                section = %self.config.section,
                version = source.version,
                path = %source.path.display(),
                op = %op,
                "Migration applied"
            );
            on_source(source);
        }

        Ok(outcome)
    }

    /// Reconcile and, unless `op` is a status read, apply.
    pub async fn run<F>(
        &mut self,
        db: &mut dyn MigrationDatabase,
        op: Operation,
        on_source: F,
    ) -> MigrateResult<ApplyOutcome>
    where
        F: FnMut(&Source),
    {
        self.reconcile(db, op).await?;
        if !op.is_mutating() {
            return Ok(ApplyOutcome::default());
        }
        self.apply(db, op, on_source).await
    }
}

/// Begin, execute and commit. Any failure leaves the transaction for the caller to roll back.
async fn run_transaction(db: &mut dyn MigrationDatabase, batch: &str) -> Result<(), String> {
    db.begin().await.map_err(|e| e.to_string())?;
    db.execute_batch(batch).await.map_err(|e| e.to_string())?;
    db.commit().await.map_err(|e| e.to_string())?;
    Ok(())
}
