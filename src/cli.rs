//! CLI definitions for delegate.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// delegate CLI.
#[derive(Parser)]
#[command(name = "delegate")]
#[command(about = "Run bounded task agents with forked history and restricted tools")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.delegate/config.toml when present)
    #[arg(short, long, global = true, env = "DELEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Delegate one task to a sub-agent driven by a scripted conversation
    Run(RunArgs),

    /// Validate the configuration file and report problems
    CheckConfig,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// JSON script of sub-agent turns
    #[arg(short, long)]
    pub script: PathBuf,

    /// Short task label
    #[arg(short, long)]
    pub task: String,

    /// Instructions handed to the sub-agent
    #[arg(short, long)]
    pub instructions: String,

    /// Turn budget (default from config)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Time budget in milliseconds (default from config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}
