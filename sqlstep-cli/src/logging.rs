//! Diagnostic logging for the CLI, controlled by environment variables.
//!
//! - `SQLSTEP_DEBUG=true|1|yes` - Enable debug logging
//! - `SQLSTEP_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SQLSTEP_LOG_FORMAT=json|pretty|compact` - Output format (default: compact)
//!
//! Logs go to stderr so reports on stdout stay machine readable. With neither
//! `SQLSTEP_DEBUG` nor `SQLSTEP_LOG_LEVEL` set, nothing is installed.

use std::env;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line human output.
    Pretty,
    /// Single-line human output.
    Compact,
}

/// Check if `value` turns debug logging on.
fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Check if debug logging is enabled via `SQLSTEP_DEBUG`.
pub fn is_debug_enabled() -> bool {
    env::var("SQLSTEP_DEBUG").map(|v| is_truthy(&v)).unwrap_or(false)
}

/// Resolve the level from `SQLSTEP_LOG_LEVEL` and `SQLSTEP_DEBUG`.
pub fn log_level(level: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Resolve the format from `SQLSTEP_LOG_FORMAT`.
pub fn log_format(format: Option<&str>) -> LogFormat {
    match format.map(str::to_lowercase).as_deref() {
        Some("json") => LogFormat::Json,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::Compact,
    }
}

/// Install the subscriber once. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let level_var = env::var("SQLSTEP_LOG_LEVEL").ok();
        let debug = is_debug_enabled();
        if !debug && level_var.is_none() {
            return;
        }

        let level = log_level(level_var.as_deref(), debug);
        let format = log_format(env::var("SQLSTEP_LOG_FORMAT").ok().as_deref());
        let filter = EnvFilter::try_new(format!(
            "sqlstep={level},sqlstep_cli={level},sqlstep_migrate={level},sqlstep_postgres={level},sqlstep_mysql={level},sqlstep_sqlite={level}"
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let layer = fmt::layer().with_writer(std::io::stderr);
        match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .init(),
        }

        tracing::debug!(level, format = ?format, "sqlstep logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(None, false), "warn");
        assert_eq!(log_level(None, true), "debug");
        assert_eq!(log_level(Some("TRACE"), false), "trace");
        assert_eq!(log_level(Some("loud"), true), "debug");
    }

    #[test]
    fn test_log_format() {
        assert_eq!(log_format(None), LogFormat::Compact);
        assert_eq!(log_format(Some("json")), LogFormat::Json);
        assert_eq!(log_format(Some("Pretty")), LogFormat::Pretty);
        assert_eq!(log_format(Some("xml")), LogFormat::Compact);
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("YES"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("off"));
    }
}
