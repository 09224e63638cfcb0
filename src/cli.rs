//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. Every
//! global flag can also be supplied through a `PRJGRAPH_*` environment
//! variable.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::manifest::DEFAULT_DESCRIPTOR;

/// Resolve C++ project descriptors into ordered build plans.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the descriptor file to use.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_DESCRIPTOR,
        env = "PRJGRAPH_FILE"
    )]
    pub file: PathBuf,

    /// Resolve the descriptor path relative to this directory.
    #[arg(short = 'C', long, value_name = "DIR", env = "PRJGRAPH_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format for plans, graphs and errors.
    #[arg(
        long,
        value_enum,
        global = true,
        default_value_t = OutputFormat::Text,
        env = "PRJGRAPH_FORMAT"
    )]
    pub format: OutputFormat,

    /// Optional subcommand to execute; defaults to `plan` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the clap error when the arguments are invalid.
    pub fn try_parse_from_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::with_default_command)
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Plan(PlanArgs::default()));
        }
        self
    }
}

/// Rendering applied to command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text; DOT for `graph`.
    #[default]
    Text,
    /// Pretty-printed JSON documents.
    Json,
}

/// Arguments accepted by the `plan` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default)]
pub struct PlanArgs {
    /// Targets to plan, by name or descriptor path. Uses the descriptor
    /// `defaults` when empty.
    #[arg(value_name = "ROOT")]
    pub roots: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Print the ordered build plan (default command).
    Plan(PlanArgs),

    /// Print the dependency graph of every declared target.
    Graph,

    /// List declared targets in registration order.
    Targets,
}
