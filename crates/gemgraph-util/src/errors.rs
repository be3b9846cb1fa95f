use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all gemgraph operations.
#[derive(Debug, Error, Diagnostic)]
pub enum GemgraphError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No gemspec or lockfile in the project directory.
    #[error("No {mode} manifest found in {}", dir.display())]
    #[diagnostic(help("Run gemgraph from a directory containing a .gemspec or Gemfile.lock"))]
    ManifestNotFound { dir: PathBuf, mode: String },

    /// A requirement string did not match any installed gem.
    #[error("Unresolved dependency: {requirement}")]
    DescendantUnresolved { requirement: String },

    /// No checksum could be computed for a gem archive.
    #[error("Checksum unavailable for {}", path.display())]
    ChecksumUnavailable { path: PathBuf },

    /// No LICENSE-like file or copyright line in a gem directory.
    #[error("No license found in {}", dir.display())]
    LicenseNotFound { dir: PathBuf },

    /// A directory expected to exist could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    #[diagnostic(help("Check the paths reported by `gem env`"))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command failed to run or exited unsuccessfully.
    #[error("Command `{program}` failed: {message}")]
    Command { program: String, message: String },

    /// Malformed manifest or tool output.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Invalid configuration file.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.gemgraph/config.toml and .gemgraph.toml for syntax errors"))]
    Config { message: String },
}

impl GemgraphError {
    /// Wrap an I/O error with the path that produced it.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used by every library crate.
pub type GemgraphResult<T> = Result<T, GemgraphError>;
