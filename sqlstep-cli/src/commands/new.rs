//! `sqlstep new` - Scaffold an empty migration source.

use std::path::{Path, PathBuf};

use sqlstep_migrate::{Annotations, write_template};

use crate::cli::NewArgs;
use crate::config::Config;
use crate::env::EnvExpander;
use crate::error::{CliError, CliResult};
use crate::output;

/// Run the new command
pub async fn run(config_path: &Path, args: NewArgs) -> CliResult<()> {
    validate_name(&args.name)?;

    let (dir, annotations) = match &args.section {
        Some(section) => {
            let settings = Config::load(config_path)?.migration_config(section, &EnvExpander::new())?;
            let dir = args
                .dir
                .clone()
                .or_else(|| settings.source_dirs.first().cloned())
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, settings.annotations)
        }
        None => (
            args.dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            Annotations::default(),
        ),
    };

    let path = write_template(&dir, &args.name, &annotations).await?;
    output::success(&format!("Created {}", path.display()));
    Ok(())
}

fn validate_name(name: &str) -> CliResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.chars().any(char::is_whitespace) {
        return Err(CliError::Config(format!(
            "invalid migration name '{}': use letters, digits, '-' or '_'",
            name
        )));
    }
    Ok(())
}
