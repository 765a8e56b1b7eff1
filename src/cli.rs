//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Path to a releasewatch.toml. Defaults to one in the project root.
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    /// Root of the GUI project to keep in sync.
    pub project_root: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll upstream releases and integrate new ones.
    Monitor {
        #[arg(long, default_value_t = false)]
        /// Run one check and exit.
        single_check: bool,
    },

    /// Integrate a saved release report into the project.
    Integrate {
        /// Path to a report file, or the report as inline JSON.
        report: String,
    },

    /// Run the post-integration smoke tests.
    Test,

    /// List upstream releases.
    Releases,
}

impl Command {
    /// Log file written by this subcommand.
    pub fn log_file(&self) -> &'static str {
        match self {
            Command::Monitor { .. } | Command::Releases => "release-monitor.log",
            Command::Integrate { .. } => "integration.log",
            Command::Test => "testing.log",
        }
    }
}
