//! Command buildpack - CNB detect/build entry point
//!
//! CLI entry point that dispatches to the lifecycle phases.

use clap::Parser;
use command_buildpack::cli::{resolve_buildpack_dir, Cli, Commands, LogFormat};
use command_buildpack::error::{FailureCode, PhaseFailure};
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(failure) => {
            eprintln!("{} {}", style("Error:").red().bold(), failure);
            if let Some(hint) = failure.source.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_logging(cli: &Cli) {
    // --log-level wins, then -v count, then BP_DEBUG
    let filter = match (&cli.log_level, cli.verbose, cli.debug) {
        (Some(level), _, _) => EnvFilter::new(format!("command_buildpack={}", level)),
        (None, 0, false) => EnvFilter::new("command_buildpack=info"),
        (None, 0 | 1, _) => EnvFilter::new("command_buildpack=debug"),
        (None, _, _) => EnvFilter::new("command_buildpack=trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    match cli.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> Result<u8, PhaseFailure> {
    match cli.command {
        Commands::Detect(args) => command_buildpack::cli::commands::detect(args),
        Commands::Build(args) => {
            let buildpack_dir = resolve_buildpack_dir(cli.buildpack_dir.as_deref())
                .map_err(|e| PhaseFailure::new(FailureCode::ComponentInitialization, e))?;
            debug!("Buildpack directory: {}", buildpack_dir.display());
            command_buildpack::cli::commands::build(args, &buildpack_dir)
        }
    }
}
