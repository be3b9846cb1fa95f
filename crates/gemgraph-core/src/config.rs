use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use gemgraph_util::errors::{GemgraphError, GemgraphResult};

use crate::DEFAULT_MAX_DEPTH;

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = ".gemgraph.toml";

/// Which manifest drives a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMode {
    /// A `.gemspec` in the project root, expanded against installed gems.
    Spec,
    /// A `Gemfile.lock` in the project root.
    Lock,
}

impl ManifestMode {
    /// File extension that identifies a manifest of this mode.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Spec => "gemspec",
            Self::Lock => "lock",
        }
    }
}

impl fmt::Display for ManifestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec => f.write_str("spec"),
            Self::Lock => f.write_str("lock"),
        }
    }
}

/// Resolver settings.
///
/// Loaded from `~/.gemgraph/config.toml`, then overlaid with
/// `.gemgraph.toml` in the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Dependency layers expanded below the root.
    #[serde(default = "default_max_depth", rename = "max-depth")]
    pub max_depth: usize,
    /// The RubyGems executable queried for install roots and versions.
    #[serde(default = "default_gem_command", rename = "gem-command")]
    pub gem_command: String,
    /// Force a manifest mode instead of detecting it.
    #[serde(default)]
    pub mode: Option<ManifestMode>,
    /// Write a minimal `Gemfile` when the project has none.
    #[serde(default = "default_repair_gemfile", rename = "repair-gemfile")]
    pub repair_gemfile: bool,
    /// Install roots scanned in addition to those reported by `gem env`.
    #[serde(default, rename = "extra-roots")]
    pub extra_roots: Vec<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            gem_command: default_gem_command(),
            mode: None,
            repair_gemfile: default_repair_gemfile(),
            extra_roots: Vec::new(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_gem_command() -> String {
    "gem".to_string()
}

fn default_repair_gemfile() -> bool {
    true
}

/// A config file where every key is optional, used for overlaying.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default, rename = "max-depth")]
    max_depth: Option<usize>,
    #[serde(default, rename = "gem-command")]
    gem_command: Option<String>,
    #[serde(default)]
    mode: Option<ManifestMode>,
    #[serde(default, rename = "repair-gemfile")]
    repair_gemfile: Option<bool>,
    #[serde(default, rename = "extra-roots")]
    extra_roots: Option<Vec<PathBuf>>,
}

impl ResolverConfig {
    /// Load the global config, then overlay the project config if present.
    pub fn load(project_root: &Path) -> GemgraphResult<Self> {
        let mut config = Self::default();
        config.overlay_file(&Self::default_path())?;
        config.overlay_file(&project_root.join(PROJECT_CONFIG_FILE))?;
        Ok(config)
    }

    /// Parse a full config from TOML text.
    pub fn parse_toml(content: &str) -> GemgraphResult<Self> {
        toml::from_str(content).map_err(|e| GemgraphError::Config {
            message: e.to_string(),
        })
    }

    /// Overlay keys present in the file at `path`. A missing file is a no-op.
    pub fn overlay_file(&mut self, path: &Path) -> GemgraphResult<()> {
        if !path.is_file() {
            return Ok(());
        }
        let content = std::fs::read_to_string(path).map_err(|e| GemgraphError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        self.overlay_toml(&content).map_err(|e| GemgraphError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(())
    }

    /// Overlay keys present in `content` onto this config.
    pub fn overlay_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let partial: PartialConfig = toml::from_str(content)?;
        if let Some(v) = partial.max_depth {
            self.max_depth = v;
        }
        if let Some(v) = partial.gem_command {
            self.gem_command = v;
        }
        if partial.mode.is_some() {
            self.mode = partial.mode;
        }
        if let Some(v) = partial.repair_gemfile {
            self.repair_gemfile = v;
        }
        if let Some(v) = partial.extra_roots {
            self.extra_roots = v;
        }
        Ok(())
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the gemgraph data directory (`~/.gemgraph/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".gemgraph")
}
