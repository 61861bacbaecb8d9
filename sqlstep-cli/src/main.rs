//! sqlstep - Command-line interface for versioned SQL migrations.

use clap::Parser;
use sqlstep_migrate::Operation;

use sqlstep_cli::cli::{Cli, Command};
use sqlstep_cli::commands;
use sqlstep_cli::error::CliResult;
use sqlstep_cli::{logging, output};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run() -> CliResult<()> {
    let Cli {
        config,
        json,
        command,
    } = Cli::parse();

    match command {
        Command::Up(args) => commands::migrate::run(&config, json, Operation::Up, &args.sections).await,
        Command::Down(args) => {
            commands::migrate::run(&config, json, Operation::Down, &args.sections).await
        }
        Command::Status(args) => {
            commands::migrate::run(&config, json, Operation::Status, &args.sections).await
        }
        Command::ForceUp(args) => {
            commands::migrate::run(&config, json, Operation::ForceUp, &args.sections).await
        }
        Command::New(args) => commands::new::run(&config, args).await,
        Command::Version => commands::version::run(),
    }
}
