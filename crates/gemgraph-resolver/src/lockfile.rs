//! `Gemfile.lock` parsing for lock mode.
//!
//! Bundler's lockfile is a custom indented format:
//! ```text
//! PATH
//!   remote: .
//!   specs:
//!     demo (0.1.0)
//!       rake (>= 10.0)
//!
//! GEM
//!   remote: https://rubygems.org/
//!   specs:
//!     rake (13.0.6)
//!
//! DEPENDENCIES
//!   demo!
//!
//! BUNDLED WITH
//!    2.4.10
//! ```
//! Gems under `specs:` are indented four spaces, their requirements six.

use std::collections::BTreeMap;
use std::path::Path;

use gemgraph_core::spec::Spec;
use gemgraph_util::errors::GemgraphResult;

/// One gem pinned in a `specs:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedGem {
    pub name: String,
    pub version: String,
    /// Requirements in lock form, e.g. `rack (>= 2.2.4)`.
    pub dependencies: Vec<String>,
}

impl LockedGem {
    pub fn to_spec(&self) -> Spec {
        Spec {
            name: self.name.clone(),
            version: self.version.clone(),
            runtime_dependencies: self.dependencies.clone(),
            ..Default::default()
        }
    }
}

/// A parsed `Gemfile.lock`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lockfile {
    /// Every pinned gem from GEM, GIT and PATH sections, by name.
    pub specs: BTreeMap<String, LockedGem>,
    /// The top-level `DEPENDENCIES`, in lock form without the `!` marker.
    pub dependencies: Vec<String>,
    /// The project's own gem, from a `PATH` section with `remote: .`.
    pub path_root: Option<LockedGem>,
    pub bundled_with: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Source,
    Dependencies,
    BundledWith,
    Other,
}

impl Lockfile {
    pub fn from_path(path: &Path) -> GemgraphResult<Self> {
        let content = gemgraph_util::fs::read_to_string(path)?;
        let lock = Self::parse(&content);
        tracing::debug!(
            "parsed {} ({} gems, {} top-level dependencies)",
            path.display(),
            lock.specs.len(),
            lock.dependencies.len()
        );
        Ok(lock)
    }

    pub fn parse(content: &str) -> Self {
        let mut lock = Self::default();
        let mut section = Section::Other;
        let mut local_source = false;
        let mut in_specs = false;
        let mut current: Option<LockedGem> = None;

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }

            // New top-level section
            if !line.starts_with(' ') {
                lock.finish_gem(current.take(), local_source);
                section = match line.trim() {
                    "GEM" | "GIT" | "PATH" | "PLUGIN SOURCE" => Section::Source,
                    "DEPENDENCIES" => Section::Dependencies,
                    "BUNDLED WITH" => Section::BundledWith,
                    _ => Section::Other,
                };
                local_source = false;
                in_specs = false;
                continue;
            }

            match section {
                Section::Source => {
                    let indent = indent_of(line);
                    let trimmed = line.trim();
                    if indent == 2 {
                        if trimmed == "specs:" {
                            in_specs = true;
                        } else if let Some(remote) = trimmed.strip_prefix("remote:") {
                            local_source = remote.trim() == ".";
                        }
                    } else if in_specs && indent == 4 {
                        lock.finish_gem(current.take(), local_source);
                        current = parse_gem_line(trimmed);
                    } else if in_specs && indent >= 6 {
                        if let Some(gem) = current.as_mut() {
                            gem.dependencies.push(trimmed.to_string());
                        }
                    }
                }
                Section::Dependencies => {
                    let dep = trimmed_dependency(line.trim());
                    if !dep.is_empty() {
                        lock.dependencies.push(dep);
                    }
                }
                Section::BundledWith => {
                    lock.bundled_with = Some(line.trim().to_string());
                }
                Section::Other => {}
            }
        }
        lock.finish_gem(current.take(), local_source);
        lock
    }

    fn finish_gem(&mut self, gem: Option<LockedGem>, local_source: bool) {
        let Some(gem) = gem else {
            return;
        };
        if local_source && self.path_root.is_none() {
            self.path_root = Some(gem.clone());
        }
        self.specs.entry(gem.name.clone()).or_insert(gem);
    }

    /// The pinned gem called `name`, as a [`Spec`] whose runtime
    /// requirements are its lock-form dependencies.
    pub fn spec(&self, name: &str) -> Option<Spec> {
        self.specs.get(name).map(LockedGem::to_spec)
    }

    /// The root of a lock-mode resolution.
    ///
    /// A `PATH` gem at `remote: .` is the project's own gem. Otherwise the
    /// root is named `project_name` and requires the top-level
    /// `DEPENDENCIES`.
    pub fn root_spec(&self, project_name: &str) -> Spec {
        match &self.path_root {
            Some(gem) => gem.to_spec(),
            None => Spec {
                name: project_name.to_string(),
                runtime_dependencies: self
                    .dependencies
                    .iter()
                    .filter(|d| lock_name(d) != project_name)
                    .cloned()
                    .collect(),
                ..Default::default()
            },
        }
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// `nokogiri (1.16.0-x86_64-linux)` to name and platform-free version.
fn parse_gem_line(trimmed: &str) -> Option<LockedGem> {
    let open = trimmed.find('(')?;
    let close = trimmed.rfind(')').filter(|&c| c > open)?;
    let name = trimmed[..open].trim();
    if name.is_empty() {
        return None;
    }
    Some(LockedGem {
        name: name.to_string(),
        version: strip_platform(trimmed[open + 1..close].trim()).to_string(),
        dependencies: Vec::new(),
    })
}

/// RubyGems versions never contain `-`; anything after one is a platform.
fn strip_platform(version: &str) -> &str {
    version.split('-').next().unwrap_or(version)
}

/// `demo!` and `rails (~> 7.1)!` lose the trailing source marker.
fn trimmed_dependency(dep: &str) -> String {
    dep.trim_end_matches('!').trim().to_string()
}

fn lock_name(dep: &str) -> &str {
    dep.split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or(dep)
}
