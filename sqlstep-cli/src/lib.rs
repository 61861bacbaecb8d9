//! sqlstep CLI - Command-line interface for versioned SQL migrations.
//!
//! This crate provides the `sqlstep` binary: configuration loading, the
//! per-section migration driver, and the source scaffold generator.

pub mod cli;
pub mod commands;
pub mod config;
pub mod connect;
pub mod env;
pub mod error;
pub mod logging;
pub mod output;

#[cfg(not(any(feature = "postgres", feature = "mysql", feature = "sqlite")))]
compile_error!("enable at least one driver feature: postgres, mysql or sqlite");
