//! `sqlstep up|down|status|force-up` - Run an operation over one or more sections.

use std::path::Path;

use sqlstep_migrate::display::{self, OutputFormat};
use sqlstep_migrate::{Migration, MigrationDatabase, Operation};
use tracing::info;

use crate::config::Config;
use crate::connect::Connection;
use crate::env::EnvExpander;
use crate::error::{CliError, CliResult};
use crate::output;

/// Run `op` over `sections` in order.
///
/// A failing section is reported and the next one still runs. A rollback fault
/// stops immediately.
pub async fn run(config_path: &Path, json: bool, op: Operation, sections: &[String]) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let expander = EnvExpander::new();
    let mut failed = Vec::new();

    for name in sections {
        match run_section(&config, &expander, name, op, json).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                output::error(&format!("Section {}: {}", name, e));
                failed.push(name.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::SectionsFailed(failed))
    }
}

async fn run_section(
    config: &Config,
    expander: &EnvExpander,
    name: &str,
    op: Operation,
    json: bool,
) -> CliResult<()> {
    let mut settings = config.migration_config(name, expander)?;
    settings.json |= json;
    let format = OutputFormat::from_json_flag(settings.json);
    let dsn = settings.dsn.clone();

    let mut migration = Migration::new(settings)?;
    migration.parse().await?;
    info!(section = name, op = %op, sources = migration.sources().len(), "Running section");

    let mut conn = Connection::open(migration.dialect(), &dsn).await?;
    let result = execute(&mut migration, conn.database(), op, format).await;
    conn.close().await;
    result
}

async fn execute(
    migration: &mut Migration,
    db: &mut dyn MigrationDatabase,
    op: Operation,
    format: OutputFormat,
) -> CliResult<()> {
    let section = migration.section().to_string();

    let outcome = migration
        .run(db, op, |source| {
            if format == OutputFormat::Text {
                output::report(&display::source_line(&section, source));
            }
        })
        .await
        .map_err(|e| {
            if e.is_fatal() {
                CliError::RollbackFault(e.to_string())
            } else {
                CliError::from(e)
            }
        })?;

    let status = migration.status();
    if format == OutputFormat::Text && status.has_anomaly() {
        output::warn(&format!(
            "{} has unapplied versions before current version {}",
            section, status.current_version
        ));
    }

    let report = match op {
        Operation::Status => display::render_status(migration, format),
        _ => display::render_apply(migration, op, &outcome, format),
    };
    output::report(report.trim_end_matches('\n'));

    match migration.take_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
