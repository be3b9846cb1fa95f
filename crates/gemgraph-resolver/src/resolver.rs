//! End-to-end resolution of a Ruby project directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gemgraph_core::config::{ManifestMode, ResolverConfig};
use gemgraph_core::spec::Spec;
use gemgraph_core::CHECKSUM_NONE;
use gemgraph_util::errors::GemgraphResult;

use crate::builder::{CacheLookup, GraphBuilder, LockLookup, Phase, Resolution, SpecLookup};
use crate::cache::{discover_roots, DependencyCache, InstallRoot, WarmReport};
use crate::env::{GemCli, GemEnv, GemEnvironment};
use crate::gemspec::parse_gemspec_file;
use crate::license::find_license;
use crate::lockfile::Lockfile;
use crate::manifest::{detect_mode, ensure_gemfile, find_manifest, find_version_constant};
use crate::version::looks_like_version;

/// Owns the dependency cache for one or more resolutions.
pub struct Resolver {
    config: ResolverConfig,
    env: Arc<dyn GemEnvironment>,
    cache: DependencyCache,
    phase: Phase,
}

impl Resolver {
    pub fn new(config: ResolverConfig, env: Arc<dyn GemEnvironment>) -> Self {
        Self {
            config,
            env,
            cache: DependencyCache::new(),
            phase: Phase::Init,
        }
    }

    /// A resolver that queries the configured `gem` executable.
    pub fn with_gem_cli(config: ResolverConfig) -> Self {
        let env = Arc::new(GemCli::new(config.gem_command.clone()));
        Self::new(config, env)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Install roots for `project_root`, highest precedence first.
    pub fn roots(&self, project_root: &Path) -> GemgraphResult<Vec<InstallRoot>> {
        let env = self.env.gem_env()?;
        Ok(discover_roots(project_root, &self.config.extra_roots, &env))
    }

    /// Index every installed gem. Roots completed by an earlier call are
    /// skipped. Without a usable `gem env`, only project-local and
    /// configured roots are scanned.
    pub async fn warm_cache(&mut self, project_root: &Path) -> WarmReport {
        self.phase = Phase::CacheWarming;
        let roots = match self.roots(project_root) {
            Ok(roots) => roots,
            Err(e) => {
                tracing::warn!("{e}; scanning local roots only");
                discover_roots(project_root, &self.config.extra_roots, &GemEnv::default())
            }
        };
        self.cache.warm(&roots, Arc::clone(&self.env)).await
    }

    /// Resolve the project in `project_root` to a flat module list.
    ///
    /// A missing manifest is the only fatal condition; unresolved
    /// requirements are reported in the [`Resolution`].
    pub async fn resolve(&mut self, project_root: &Path) -> GemgraphResult<Resolution> {
        self.phase = Phase::Init;
        let mode = self
            .config
            .mode
            .unwrap_or_else(|| detect_mode(project_root));
        let manifest = find_manifest(project_root, mode)?;
        tracing::info!("resolving {} in {mode} mode", manifest.display());

        if mode == ManifestMode::Spec && self.config.repair_gemfile {
            if let Err(e) = ensure_gemfile(project_root) {
                tracing::warn!("{e}");
            }
        }

        self.warm_cache(project_root).await;

        let lock = match mode {
            ManifestMode::Lock => Some(Lockfile::from_path(&manifest)?),
            ManifestMode::Spec => None,
        };
        let mut root = match &lock {
            Some(lock) => root_from_lockfile(lock, project_root),
            None => root_from_gemspec(&manifest, project_root)?,
        };
        attach_project_metadata(&mut root, project_root);

        let max_depth = self.config.max_depth;
        let (resolution, phase) = match &lock {
            Some(lock) => build(&LockLookup::new(lock, &self.cache), max_depth, &root),
            None => build(&CacheLookup::new(&self.cache), max_depth, &root),
        };
        self.phase = phase;

        tracing::info!(
            "resolved {} modules, {} unresolved requirements",
            resolution.modules.len(),
            resolution.unresolved.len()
        );
        Ok(resolution)
    }
}

fn build(lookup: &dyn SpecLookup, max_depth: usize, root: &Spec) -> (Resolution, Phase) {
    let mut builder = GraphBuilder::new(lookup, max_depth);
    let resolution = builder.build(root);
    (resolution, builder.phase())
}

/// Parse the project's gemspec, recovering a constant version from
/// `lib/**/version.rb`.
fn root_from_gemspec(manifest: &Path, project_root: &Path) -> GemgraphResult<Spec> {
    let mut root = parse_gemspec_file(manifest)?;
    if root.name.is_empty() {
        root.name = gemgraph_util::fs::file_stem(manifest)
            .unwrap_or_default()
            .to_string();
    }
    if !looks_like_version(&root.version) {
        match find_version_constant(project_root) {
            Some(version) => root.version = version,
            None => {
                if !root.version.is_empty() {
                    tracing::debug!("cannot evaluate version `{}`", root.version);
                }
                root.version.clear();
            }
        }
    }
    Ok(root)
}

/// The lockfile's root, with metadata from the project's own gemspec when
/// the lockfile pins it as a `PATH` gem.
fn root_from_lockfile(lock: &Lockfile, project_root: &Path) -> Spec {
    let root = lock.root_spec(&project_name(project_root));
    if lock.path_root.is_none() {
        return root;
    }
    let gemspec = find_manifest(project_root, ManifestMode::Spec)
        .and_then(|path| parse_gemspec_file(&path));
    match gemspec {
        Ok(gemspec) => Spec {
            name: root.name,
            version: root.version,
            runtime_dependencies: root.runtime_dependencies,
            ..gemspec
        },
        Err(_) => root,
    }
}

/// The project root has no package archive, so it never gets a checksum.
fn attach_project_metadata(root: &mut Spec, project_root: &Path) {
    root.checksum = CHECKSUM_NONE.to_string();
    root.install_dir = Some(project_root.to_path_buf());
    match find_license(project_root) {
        Ok(license) => {
            root.copyright = license.copyright.unwrap_or_default();
            root.license_text = license.text;
        }
        Err(e) => tracing::debug!("{e}"),
    }
}

/// The directory name of `project_root`, canonicalizing `.` and friends.
fn project_name(project_root: &Path) -> String {
    let path = project_root
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(project_root));
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string()
}
