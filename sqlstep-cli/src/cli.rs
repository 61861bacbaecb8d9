//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// sqlstep - Versioned SQL migrations
#[derive(Parser, Debug)]
#[command(name = "sqlstep")]
#[command(version)]
#[command(about = "sqlstep - Versioned SQL migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "SQLSTEP_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Emit one JSON record per section instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending migrations newer than the current version
    Up(SectionArgs),

    /// Revert the current version
    Down(SectionArgs),

    /// Show applied, pending and out-of-order versions
    Status(SectionArgs),

    /// Apply every unapplied migration, including ones older than the current version
    ForceUp(SectionArgs),

    /// Create a new, empty migration source
    New(NewArgs),

    /// Display version information
    Version,
}

/// Sections a migration command runs against, in order.
#[derive(Args, Debug)]
pub struct SectionArgs {
    /// Section names from the configuration file
    #[arg(required = true, num_args = 1..)]
    pub sections: Vec<String>,
}

/// Arguments for the `new` command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Descriptive name, appended to the timestamp
    pub name: String,

    /// Directory to write into
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Take the directory and annotations from this section
    #[arg(short, long)]
    pub section: Option<String>,
}
