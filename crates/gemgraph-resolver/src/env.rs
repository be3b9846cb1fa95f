//! The host RubyGems installation: `gem env` and `gem list`.
//!
//! [`GemEnvironment`] is the seam between the resolver and the `gem`
//! executable. [`GemCli`] shells out; [`StaticEnvironment`] serves fixed
//! roots for hosts without Ruby or for explicitly pinned install roots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gemgraph_util::errors::{GemgraphError, GemgraphResult};
use gemgraph_util::process::CommandBuilder;

/// Install locations reported by `gem env`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GemEnv {
    pub installation_dir: Option<PathBuf>,
    pub user_installation_dir: Option<PathBuf>,
    pub spec_cache_dir: Option<PathBuf>,
    pub gem_paths: Vec<PathBuf>,
}

/// Queries against the host RubyGems installation.
pub trait GemEnvironment: Send + Sync {
    /// Install roots and cache directories.
    fn gem_env(&self) -> GemgraphResult<GemEnv>;

    /// Installed version of the gem with exactly this name, if any.
    fn installed_version(&self, name: &str) -> GemgraphResult<Option<String>>;
}

/// [`GemEnvironment`] backed by the `gem` executable.
#[derive(Debug, Clone)]
pub struct GemCli {
    program: String,
}

impl GemCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GemCli {
    fn default() -> Self {
        Self::new("gem")
    }
}

impl GemEnvironment for GemCli {
    fn gem_env(&self) -> GemgraphResult<GemEnv> {
        let stdout = CommandBuilder::new(&self.program).arg("env").exec_stdout()?;
        let env = parse_gem_env(&stdout);
        if env.installation_dir.is_none() && env.gem_paths.is_empty() {
            return Err(GemgraphError::Parse {
                message: format!("`{} env` reported no install roots", self.program),
            });
        }
        Ok(env)
    }

    fn installed_version(&self, name: &str) -> GemgraphResult<Option<String>> {
        let stdout = CommandBuilder::new(&self.program)
            .args(["list", "--local", "--exact", name])
            .exec_stdout()?;
        Ok(parse_gem_list(&stdout, name))
    }
}

/// [`GemEnvironment`] with fixed roots and known versions.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    env: GemEnv,
    versions: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new(gem_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            env: GemEnv {
                gem_paths: gem_paths.into_iter().collect(),
                ..Default::default()
            },
            versions: HashMap::new(),
        }
    }

    /// Answer `installed_version(name)` with `version`.
    pub fn with_version(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.versions.insert(name.into(), version.into());
        self
    }
}

impl GemEnvironment for StaticEnvironment {
    fn gem_env(&self) -> GemgraphResult<GemEnv> {
        Ok(self.env.clone())
    }

    fn installed_version(&self, name: &str) -> GemgraphResult<Option<String>> {
        Ok(self.versions.get(name).cloned())
    }
}

/// Parse the output of `gem env`.
///
/// ```text
/// RubyGems Environment:
///   - INSTALLATION DIRECTORY: /var/lib/gems/3.0.0
///   - SPEC CACHE DIRECTORY: /root/.local/share/gem/specs
///   - GEM PATHS:
///      - /var/lib/gems/3.0.0
///      - /root/.local/share/gem/ruby/3.0.0
///   - GEM CONFIGURATION:
/// ```
pub fn parse_gem_env(output: &str) -> GemEnv {
    let mut env = GemEnv::default();
    let mut paths_indent: Option<usize> = None;

    for line in output.lines() {
        let indent = line.len() - line.trim_start().len();
        let item = line.trim().trim_start_matches('-').trim();
        if item.is_empty() {
            continue;
        }

        if let Some(section_indent) = paths_indent {
            if indent > section_indent {
                push_unique(&mut env.gem_paths, PathBuf::from(item));
                continue;
            }
            paths_indent = None;
        }

        let Some((key, value)) = item.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "INSTALLATION DIRECTORY" => env.installation_dir = non_empty_path(value),
            "USER INSTALLATION DIRECTORY" => env.user_installation_dir = non_empty_path(value),
            "SPEC CACHE DIRECTORY" => env.spec_cache_dir = non_empty_path(value),
            "GEM PATHS" => paths_indent = Some(indent),
            _ => {}
        }
    }

    env
}

/// Parse `gem list --exact <name>` output (`rake (13.0.6, default: 12.3.3)`)
/// into the newest listed version.
pub fn parse_gem_list(output: &str, name: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let line = line.trim();
        let rest = line.strip_prefix(name)?.trim_start();
        let inner = rest.strip_prefix('(')?;
        let inner = inner.split(')').next()?;
        let first = inner.split(',').next()?.trim();
        let first = first.strip_prefix("default:").unwrap_or(first).trim();
        // platform gems list as `1.16.0 x86_64-linux`
        let version = first.split_whitespace().next()?;
        (!version.is_empty()).then(|| version.to_string())
    })
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.iter().any(|p| p == &path) {
        paths.push(path);
    }
}

/// Project-local Bundler roots: `vendor/bundle/ruby/<abi>/`.
pub fn vendor_roots(project_root: &Path) -> Vec<PathBuf> {
    let base = project_root.join("vendor").join("bundle").join("ruby");
    let Ok(entries) = std::fs::read_dir(&base) else {
        return Vec::new();
    };
    let mut roots: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    roots.sort();
    roots
}
