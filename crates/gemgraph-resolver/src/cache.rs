//! Index of every gem installed under the discovered install roots.
//!
//! Warm-up reads `<root>/specifications/*.gemspec` for each root, parsing
//! files concurrently on the blocking pool. Results are merged by a single
//! consumer, so the maps are never shared between tasks. Once warm-up has
//! drained, the cache is only read.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gemgraph_core::spec::{clean_name, Spec};
use gemgraph_core::CHECKSUM_NONE;
use gemgraph_util::errors::{GemgraphError, GemgraphResult};
use gemgraph_util::fs::{file_stem, list_files};
use tokio::task::JoinSet;

use crate::checksum::compute_checksum;
use crate::env::{vendor_roots, GemEnv, GemEnvironment};
use crate::gemspec::parse_gemspec_file;
use crate::license::find_license;
use crate::requirement::Requirement;
use crate::version::{looks_like_version, GemVersion};

/// Where an install root came from. Earlier variants take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RootKind {
    /// `vendor/bundle/ruby/<abi>` inside the project.
    Vendor,
    /// Listed under `extra-roots` in the config.
    Configured,
    /// `gem env` INSTALLATION DIRECTORY.
    Installation,
    /// Any other `gem env` GEM PATHS entry.
    GemPath,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vendor => "vendor",
            Self::Configured => "configured",
            Self::Installation => "installation",
            Self::GemPath => "gem-path",
        })
    }
}

/// Precedence of a root; lower sorts first and wins.
pub type Rank = (RootKind, usize);

/// A directory laid out like a RubyGems home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot {
    pub path: PathBuf,
    pub kind: RootKind,
    /// Discovery order, used to rank roots of the same kind.
    pub order: usize,
}

impl InstallRoot {
    pub fn rank(&self) -> Rank {
        (self.kind, self.order)
    }

    pub fn specifications_dir(&self) -> PathBuf {
        self.path.join("specifications")
    }

    pub fn gems_dir(&self) -> PathBuf {
        self.path.join("gems")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.path.join("cache")
    }
}

/// Every install root to scan, highest precedence first, without duplicates.
pub fn discover_roots(project_root: &Path, extra_roots: &[PathBuf], env: &GemEnv) -> Vec<InstallRoot> {
    let candidates = vendor_roots(project_root)
        .into_iter()
        .map(|p| (p, RootKind::Vendor))
        .chain(extra_roots.iter().map(|p| (project_root.join(p), RootKind::Configured)))
        .chain(
            env.installation_dir
                .iter()
                .map(|p| (p.clone(), RootKind::Installation)),
        )
        .chain(
            env.user_installation_dir
                .iter()
                .chain(env.gem_paths.iter())
                .map(|p| (p.clone(), RootKind::GemPath)),
        );

    let mut roots: Vec<InstallRoot> = Vec::new();
    for (path, kind) in candidates {
        if roots.iter().any(|r| r.path == path) {
            continue;
        }
        let order = roots.len();
        roots.push(InstallRoot { path, kind, order });
    }
    roots
}

#[derive(Debug, Clone)]
struct Entry {
    rank: Rank,
    spec: Spec,
}

/// The installed versions of one gem.
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    entries: BTreeMap<String, Entry>,
}

impl VersionMap {
    /// Store `spec` unless a root of equal or higher precedence already
    /// provided this version. Returns whether it was stored.
    fn insert(&mut self, rank: Rank, spec: Spec) -> bool {
        match self.entries.get(&spec.version) {
            Some(existing) if existing.rank <= rank => false,
            _ => {
                self.entries.insert(spec.version.clone(), Entry { rank, spec });
                true
            }
        }
    }

    pub fn get(&self, version: &str) -> Option<&Spec> {
        self.entries.get(version).map(|e| &e.spec)
    }

    /// Number of distinct installed versions.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spec> {
        self.entries.values().map(|e| &e.spec)
    }

    /// The version with the numerically highest major; ties go to the
    /// greater full version.
    pub fn highest_major(&self) -> Option<&Spec> {
        self.iter().max_by(|a, b| {
            let (va, vb) = (GemVersion::parse(&a.version), GemVersion::parse(&b.version));
            va.major().cmp(&vb.major()).then_with(|| va.cmp(&vb))
        })
    }
}

/// Outcome of a [`DependencyCache::warm`] call.
#[derive(Debug, Default)]
pub struct WarmReport {
    pub roots_scanned: usize,
    /// Roots already warmed by an earlier call.
    pub roots_skipped: usize,
    pub specs_loaded: usize,
    /// Recoverable failures: unreadable roots and unparsable spec files.
    pub failures: Vec<GemgraphError>,
}

/// Installed gems by cleaned name.
#[derive(Debug, Default)]
pub struct DependencyCache {
    gems: HashMap<String, VersionMap>,
    completed: HashSet<PathBuf>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spec found under a root of the given rank.
    pub fn insert(&mut self, rank: Rank, spec: Spec) -> bool {
        let name = clean_name(&spec.name);
        if name.is_empty() {
            return false;
        }
        self.gems.entry(name).or_default().insert(rank, spec)
    }

    pub fn get(&self, name: &str) -> Option<&VersionMap> {
        self.gems.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.gems.contains_key(name)
    }

    /// Number of distinct gem names.
    pub fn len(&self) -> usize {
        self.gems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }

    /// Whether `root` has been fully scanned.
    pub fn is_complete(&self, root: &Path) -> bool {
        self.completed.contains(root)
    }

    /// Scan every root not already completed.
    ///
    /// An unreadable `specifications/` directory is logged and reported in
    /// the returned [`WarmReport`]; the root stays incomplete so a later
    /// call retries it, as does a root with a parse task that panicked.
    /// Returns only after every spawned parse has finished.
    pub async fn warm(&mut self, roots: &[InstallRoot], env: Arc<dyn GemEnvironment>) -> WarmReport {
        let mut report = WarmReport::default();
        let mut join_set = JoinSet::new();
        // outstanding parse tasks per root
        let mut pending: HashMap<PathBuf, usize> = HashMap::new();

        for root in roots {
            if self.completed.contains(&root.path) || pending.contains_key(&root.path) {
                report.roots_skipped += 1;
                continue;
            }
            let spec_dir = root.specifications_dir();
            let files = match list_files(&spec_dir) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("skipping install root {}: {e}", root.path.display());
                    report.failures.push(e);
                    continue;
                }
            };
            tracing::debug!(
                "scanning {} ({} files)",
                spec_dir.display(),
                files.len()
            );
            for path in files {
                if path.extension().and_then(|e| e.to_str()) != Some("gemspec") {
                    continue;
                }
                let root = root.clone();
                let env = Arc::clone(&env);
                *pending.entry(root.path.clone()).or_default() += 1;
                join_set.spawn_blocking(move || {
                    let rank = root.rank();
                    let loaded = load_installed_spec(&path, &root, env.as_ref());
                    (root.path, rank, loaded)
                });
            }
            pending.entry(root.path.clone()).or_default();
            report.roots_scanned += 1;
        }

        while let Some(result) = join_set.join_next().await {
            let (root_path, rank, loaded) = match result {
                Ok(done) => done,
                Err(e) => {
                    tracing::warn!("spec parse task failed: {e}");
                    continue;
                }
            };
            if let Some(count) = pending.get_mut(&root_path) {
                *count -= 1;
            }
            match loaded {
                Ok(spec) => {
                    if self.insert(rank, spec) {
                        report.specs_loaded += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    report.failures.push(e);
                }
            }
        }

        // A root whose tasks did not all finish is rescanned next time.
        for (path, outstanding) in pending {
            if outstanding == 0 {
                self.completed.insert(path);
            } else {
                tracing::warn!(
                    "{outstanding} spec parses failed under {}; root left incomplete",
                    path.display()
                );
            }
        }

        tracing::info!(
            "dependency cache holds {} gems ({} roots scanned, {} skipped)",
            self.gems.len(),
            report.roots_scanned,
            report.roots_skipped
        );
        report
    }

    /// Resolve a requirement string to an installed spec.
    ///
    /// An exact `(name, version)` match wins. Otherwise the only installed
    /// version is used, and with several installed the highest major wins.
    pub fn resolve(&self, requirement: &str) -> GemgraphResult<&Spec> {
        let unresolved = || GemgraphError::DescendantUnresolved {
            requirement: requirement.trim().to_string(),
        };
        let req = Requirement::parse(requirement).ok_or_else(unresolved)?;
        let versions = self.gems.get(&req.name).ok_or_else(unresolved)?;

        if let Some(spec) = req.version_token().and_then(|v| versions.get(v)) {
            return Ok(spec);
        }
        if versions.count() == 1 {
            return versions.iter().next().ok_or_else(unresolved);
        }
        versions.highest_major().ok_or_else(unresolved)
    }
}

/// Parse one installed gemspec and attach install dir, checksum and license.
fn load_installed_spec(
    path: &Path,
    root: &InstallRoot,
    env: &dyn GemEnvironment,
) -> GemgraphResult<Spec> {
    let mut spec = parse_gemspec_file(path)?;
    let stem = file_stem(path).unwrap_or_default().to_string();
    recover_identity(&mut spec, &stem, env);

    let install_dir = root.gems_dir().join(&stem);
    spec.checksum = match compute_checksum(&root.cache_dir(), &stem) {
        Ok(Some(digest)) => digest,
        Ok(None) => CHECKSUM_NONE.to_string(),
        Err(e) => {
            tracing::debug!("{e}");
            CHECKSUM_NONE.to_string()
        }
    };
    match find_license(&install_dir) {
        Ok(license) => {
            spec.copyright = license.copyright.unwrap_or_default();
            spec.license_text = license.text;
        }
        Err(e) => tracing::debug!("{e}"),
    }
    spec.install_dir = Some(install_dir);
    Ok(spec)
}

/// Fill in a missing name from the file stem. A missing version, or one
/// assigned from a constant such as `Foo::VERSION`, comes from `gem list`,
/// then from the stem.
fn recover_identity(spec: &mut Spec, stem: &str, env: &dyn GemEnvironment) {
    let (stem_name, stem_version) = split_stem(stem);
    if spec.name.is_empty() {
        spec.name = stem_name.to_string();
    }
    if looks_like_version(&spec.version) {
        return;
    }
    match env.installed_version(&spec.name) {
        Ok(Some(version)) => spec.version = version,
        Ok(None) => spec.version = stem_version.to_string(),
        Err(e) => {
            tracing::debug!("version lookup for {} failed: {e}", spec.name);
            spec.version = stem_version.to_string();
        }
    }
}

/// Split `rack-test-2.1.0` or `nokogiri-1.16.0-x86_64-linux` into name and
/// version. The version starts at the first `-` followed by a version
/// segment; a trailing platform is dropped.
pub fn split_stem(stem: &str) -> (&str, &str) {
    let mut search = 0;
    while let Some(offset) = stem[search..].find('-') {
        let dash = search + offset;
        let rest = &stem[dash + 1..];
        let version = rest.split('-').next().unwrap_or(rest);
        if looks_like_version(version) {
            return (&stem[..dash], version);
        }
        search = dash + 1;
    }
    (stem, "")
}
