use std::{
    error::Error as _,
    io::{self, Write},
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod message;
mod profile;
mod prompt;
mod session;
mod storage;
mod validation;

use cli::{Cli, Commands, ProfileCommands};
use error::AppError;
use prompt::InquirePrompter;
use storage::{ProfileStore, default_profile_path};

/// Environment variable holding the log filter
const LOG_ENV: &str = "LOG_LEVEL";

// Main
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // stderr is gone if this fails; the exit code still reports it
            let _ = report(&err, cli.debug, &mut io::stderr().lock());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if debug { "kt=debug,warn" } else { "error" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let store = match &cli.profile_file {
        Some(path) => ProfileStore::new(path),
        None => ProfileStore::new(default_profile_path()?),
    };
    debug!(path = ?store.path(), "using profile file");
    let prompter = InquirePrompter::from_env();

    match &cli.command {
        Commands::Post(args) => {
            commands::post(&store, &prompter, args, Duration::from_secs(cli.timeout))
        }
        Commands::Profile(ProfileCommands::Add) => commands::add_profile(&store, &prompter),
        Commands::Profile(ProfileCommands::Remove { name }) => {
            commands::remove_profile(&store, &prompter, name).map(|_| ())
        }
        Commands::Profile(ProfileCommands::List) => {
            commands::list_profiles(&store, &mut io::stdout().lock())
        }
        Commands::Profile(ProfileCommands::SetDefault { name }) => {
            commands::set_default_profile(&store, &prompter, name).map(|_| ())
        }
    }
}

/// Writes `err` as a single line, or with its full source chain under `--debug`
fn report(err: &AppError, debug: bool, out: &mut dyn Write) -> io::Result<()> {
    if err.is_unexpected() {
        error!(error = ?err, "unexpected failure");
    }
    writeln!(out, "{}", err.to_string().red())?;

    if debug {
        let mut source = err.source();
        while let Some(cause) = source {
            writeln!(out, "  {} {}", "caused by:".yellow(), cause)?;
            source = cause.source();
        }
        writeln!(out, "{err:#?}")?;
    }
    Ok(())
}
