//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `buildlink`.
#[derive(Debug, Parser)]
#[command(name = "buildlink", version, about = "Link CI builds to issue tracker entries")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Comment on and apply commands to issues referenced by the build's changelog.
    UpdateIssues(RunArgs),
    /// File a new issue for the build.
    CreateIssue(RunArgs),
    /// Print the run record stored for a build.
    ShowRecord {
        /// Build directory holding the run record.
        #[arg(long)]
        record_dir: PathBuf,
    },
}

/// Inputs shared by the actions that talk to the tracker.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Job configuration (YAML).
    #[arg(long)]
    pub config: PathBuf,
    /// Build description: build info, variables, changelog (YAML).
    #[arg(long)]
    pub build: PathBuf,
    /// Tracker session cassette to replay.
    #[arg(long)]
    pub tracker: PathBuf,
    /// Build directory where the run record is kept.
    #[arg(long)]
    pub record_dir: Option<PathBuf>,
}
