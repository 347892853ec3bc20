//! Command-line interface definition.

use std::path::PathBuf;

use calwidget_core::TracingOutputFormat;
use clap::{Parser, Subcommand};

/// calwidget - Calendar events as signage content
#[derive(Debug, Parser)]
#[command(name = "calwidget")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(long, short, env = "CALWIDGET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Display name of the content item
    #[arg(long, short, env = "CALWIDGET_NAME", default_value = "Calendar")]
    pub name: String,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format on stderr: pretty, compact or json
    #[arg(long, env = "CALWIDGET_LOG_FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the command to run; rendering when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Render { json: false })
    }
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch the calendar and print the rendered documents
    Render {
        /// Print the documents as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Check the configuration, including a live fetch
    Validate,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration as TOML
    Dump,

    /// Show configuration file path
    Path,
}
