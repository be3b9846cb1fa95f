//! CLI argument definitions for gemgraph.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gemgraph_core::config::ManifestMode;

#[derive(Parser, Debug)]
#[command(
    name = "gemgraph",
    version,
    about = "Resolve the dependency graph of a Ruby project",
    long_about = "gemgraph reads a project's gemspec or Gemfile.lock, indexes the gems \
                  installed on this machine and prints the resulting module graph without \
                  running Ruby."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a project's dependencies
    Resolve {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Dependency layers to expand below the root
        #[arg(long)]
        depth: Option<usize>,
        /// Manifest to read (detected when omitted)
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Scan these install roots instead of asking `gem env`
        #[arg(long = "gem-path", value_name = "DIR")]
        gem_paths: Vec<PathBuf>,
        /// Explain why a gem is included
        #[arg(long)]
        why: Option<String>,
    },

    /// List the install roots that would be scanned
    Roots {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Use these install roots instead of asking `gem env`
        #[arg(long = "gem-path", value_name = "DIR")]
        gem_paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// The flat module list as JSON
    Json,
    /// An indented dependency tree
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// The project's `.gemspec`
    Spec,
    /// The project's `Gemfile.lock`
    Lock,
}

impl From<Mode> for ManifestMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Spec => ManifestMode::Spec,
            Mode::Lock => ManifestMode::Lock,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
