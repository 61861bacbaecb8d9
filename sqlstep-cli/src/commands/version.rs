//! `sqlstep version` - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command
pub fn run() -> CliResult<()> {
    kv("Version", VERSION);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";
    kv("Build", build_mode);

    let mut drivers = Vec::new();
    #[cfg(feature = "postgres")]
    drivers.push("postgres");
    #[cfg(feature = "mysql")]
    drivers.push("mysql");
    #[cfg(feature = "sqlite")]
    drivers.push("sqlite");
    kv("Drivers", &drivers.join(", "));

    output::dim(env!("CARGO_PKG_REPOSITORY"));
    Ok(())
}
