//! Rendering of statuses and apply results.
//!
//! Everything here is a pure function of a [`Migration`]; printing is left to the caller.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::engine::{ApplyOutcome, Migration, Operation};
use crate::source::Source;

/// How results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable text.
    #[default]
    Text,
    /// One JSON record per invocation.
    Json,
}

impl OutputFormat {
    /// Pick the format from a `json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Severity attached to structured records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Normal result.
    Info,
    /// Anomaly or missing table.
    Warning,
    /// An apply error occurred.
    Error,
}

#[derive(Debug, Serialize)]
struct SourceRecord {
    version: u64,
    file: String,
    applied: bool,
    duplicate: bool,
}

impl From<&Source> for SourceRecord {
    fn from(source: &Source) -> Self {
        Self {
            version: source.version,
            file: source.file_name(),
            applied: source.applied,
            duplicate: source.duplicate,
        }
    }
}

#[derive(Debug, Serialize)]
struct Record<'a> {
    time: String,
    severity: Severity,
    section: &'a str,
    operation: &'static str,
    current: u64,
    sources: Vec<SourceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before_unapplied: Option<Vec<SourceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_unapplied: Option<Vec<SourceRecord>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    table_missing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Severity of the current status of a section.
pub fn severity(migration: &Migration) -> Severity {
    let status = migration.status();
    if status.error.is_some() {
        Severity::Error
    } else if status.has_anomaly() || status.table_missing {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// One streamed line per attempted source: `OK 3 to main is 003_users.sql`.
pub fn source_line(section: &str, source: &Source) -> String {
    format!(
        "{} {} to {} is {}",
        state(source.applied),
        source.version,
        section,
        source.file_name()
    )
}

fn state(applied: bool) -> &'static str {
    if applied { "OK" } else { "NG" }
}

fn records(migration: &Migration, indices: &[usize]) -> Vec<SourceRecord> {
    indices
        .iter()
        .map(|&i| SourceRecord::from(migration.source(i)))
        .collect()
}

fn non_empty(records: Vec<SourceRecord>) -> Option<Vec<SourceRecord>> {
    if records.is_empty() { None } else { Some(records) }
}

fn to_json(record: &Record<'_>) -> String {
    // Every field is a plain string, number or bool.
    serde_json::to_string(record).unwrap_or_default()
}

fn record<'a>(migration: &'a Migration, op: Operation) -> Record<'a> {
    let status = migration.status();
    Record {
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        severity: severity(migration),
        section: migration.section(),
        operation: op.label(),
        current: status.current_version,
        sources: Vec::new(),
        before_unapplied: None,
        after_unapplied: None,
        table_missing: status.table_missing,
        error: status.error.as_ref().map(|e| e.to_string()),
    }
}

fn listing(migration: &Migration, indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| {
            let source = migration.source(i);
            format!("        {} {}\n", source.version, source.file_name())
        })
        .collect()
}

/// Render the reconciled status of a section.
pub fn render_status(migration: &Migration, format: OutputFormat) -> String {
    let status = migration.status();

    if format == OutputFormat::Json {
        let mut record = record(migration, Operation::Status);
        record.before_unapplied = non_empty(records(migration, &status.before_unapplied));
        record.after_unapplied = non_empty(records(migration, &status.after_unapplied));
        return to_json(&record);
    }

    let mut out = format!("Version of {}:\n", migration.section());
    if status.table_missing {
        out.push_str("    version table does not exist\n");
    }
    if !status.before_unapplied.is_empty() {
        out.push_str("    unapplied version before current:\n");
        out.push_str(&listing(migration, &status.before_unapplied));
    }
    out.push_str(&format!("    current:\n        {}\n", status.current_version));
    if !status.after_unapplied.is_empty() {
        out.push_str("    unapplied:\n");
        out.push_str(&listing(migration, &status.after_unapplied));
    }
    out
}

/// Render the result of an apply pass.
pub fn render_apply(
    migration: &Migration,
    op: Operation,
    outcome: &ApplyOutcome,
    format: OutputFormat,
) -> String {
    let status = migration.status();

    if format == OutputFormat::Json {
        let mut record = record(migration, op);
        record.sources = records(migration, &status.processed);
        return to_json(&record);
    }

    if outcome.is_noop() {
        return format!("nothing to migrate in {}", migration.section());
    }

    let mut out = format!(
        "{} of {} {} migrations applied to {}",
        outcome.applied,
        outcome.selected,
        op,
        migration.section()
    );
    if let Some(err) = &status.error {
        out.push_str(&format!("\n{}", err));
    }
    out
}
