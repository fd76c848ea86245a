//! CLI argument definitions using clap derive

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// riff command function buildpack
///
/// Detects an executable function artifact and contributes the command
/// invoker that runs it.
#[derive(Parser, Debug)]
#[command(name = "command-buildpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Phase to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log level filter, overrides -v and BP_DEBUG
    #[arg(long, global = true, env = "BP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Enable debug logging
    #[arg(
        long,
        global = true,
        env = "BP_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Log output format
    #[arg(long, global = true, env = "BP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Buildpack directory holding buildpack.toml and dependency-cache/
    #[arg(long, global = true, env = "CNB_BUILDPACK_DIR")]
    pub buildpack_dir: Option<PathBuf>,
}

/// Lifecycle phases
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide whether the buildpack applies to the application
    Detect(DetectArgs),

    /// Contribute the function layers and launch metadata
    Build(BuildArgs),
}

/// Arguments for the detect phase
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Platform directory; passed positionally by the lifecycle, not read
    pub platform: PathBuf,

    /// Path the detect plan is written to
    pub plan: PathBuf,

    /// Application directory (defaults to current directory)
    #[arg(long, env = "CNB_APP_DIR")]
    pub app: Option<PathBuf>,
}

/// Arguments for the build phase
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Layers directory
    pub layers: PathBuf,

    /// Platform directory; passed positionally by the lifecycle, not read
    pub platform: PathBuf,

    /// Buildpack plan path
    pub plan: PathBuf,

    /// Application directory (defaults to current directory)
    #[arg(long, env = "CNB_APP_DIR")]
    pub app: Option<PathBuf>,

    /// Stack id
    #[arg(long, env = "CNB_STACK_ID")]
    pub stack: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// JSON lines
    Json,
}
