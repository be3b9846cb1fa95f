//! Bounded, layer-by-layer expansion of a root spec into modules.

use std::collections::HashMap;
use std::fmt;

use gemgraph_core::module::Module;
use gemgraph_core::spec::{clean_name, Spec};
use gemgraph_util::errors::{GemgraphError, GemgraphResult};

use crate::cache::DependencyCache;
use crate::graph::ModuleGraph;
use crate::lockfile::Lockfile;
use crate::requirement::Requirement;

/// Turns a raw requirement string into the spec that satisfies it.
pub trait SpecLookup {
    fn lookup(&self, requirement: &str) -> GemgraphResult<Spec>;
}

/// Spec mode: requirements are matched against installed gems.
pub struct CacheLookup<'a> {
    cache: &'a DependencyCache,
}

impl<'a> CacheLookup<'a> {
    pub fn new(cache: &'a DependencyCache) -> Self {
        Self { cache }
    }
}

impl SpecLookup for CacheLookup<'_> {
    fn lookup(&self, requirement: &str) -> GemgraphResult<Spec> {
        self.cache.resolve(requirement).cloned()
    }
}

/// Lock mode: requirements are pinned by a `Gemfile.lock`.
///
/// A pinned gem that is also installed at the locked version picks up the
/// installed spec's metadata (license, checksum, authors); its requirements
/// always come from the lockfile.
pub struct LockLookup<'a> {
    lock: &'a Lockfile,
    cache: &'a DependencyCache,
}

impl<'a> LockLookup<'a> {
    pub fn new(lock: &'a Lockfile, cache: &'a DependencyCache) -> Self {
        Self { lock, cache }
    }
}

impl SpecLookup for LockLookup<'_> {
    fn lookup(&self, requirement: &str) -> GemgraphResult<Spec> {
        let unresolved = || GemgraphError::DescendantUnresolved {
            requirement: requirement.trim().to_string(),
        };
        let req = Requirement::parse(requirement).ok_or_else(unresolved)?;
        let locked = self.lock.specs.get(&req.name).ok_or_else(unresolved)?;

        let installed = self
            .cache
            .get(&locked.name)
            .and_then(|versions| versions.get(&locked.version));
        Ok(match installed {
            Some(spec) => Spec {
                runtime_dependencies: locked.dependencies.clone(),
                ..spec.clone()
            },
            None => locked.to_spec(),
        })
    }
}

/// Progress of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    CacheWarming,
    RootResolved,
    /// Resolving requirements of the modules at this depth.
    Expanding(usize),
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::CacheWarming => f.write_str("cache warming"),
            Self::RootResolved => f.write_str("root resolved"),
            Self::Expanding(layer) => write!(f, "expanding layer {layer}"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// A requirement that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Name of the module that declared the requirement.
    pub parent: String,
    pub requirement: String,
}

/// Flat output of a resolution. The root is always the first module.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub modules: Vec<Module>,
    pub unresolved: Vec<Unresolved>,
}

impl Resolution {
    pub fn root(&self) -> Option<&Module> {
        self.modules.first().filter(|m| m.root)
    }

    pub fn graph(&self) -> ModuleGraph {
        ModuleGraph::from_modules(&self.modules)
    }
}

/// Expands a root spec's runtime requirements, one layer per depth level.
pub struct GraphBuilder<'a> {
    lookup: &'a dyn SpecLookup,
    max_depth: usize,
    phase: Phase,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(lookup: &'a dyn SpecLookup, max_depth: usize) -> Self {
        Self {
            lookup,
            max_depth,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("{} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Build the module list for `root`.
    ///
    /// Each module is emitted once, at the depth where it is first reached.
    /// Modules at `max_depth` are emitted but their requirements are not
    /// resolved. Every unresolved requirement is logged and collected.
    pub fn build(&mut self, root: &Spec) -> Resolution {
        let mut modules = vec![Module::from_spec(root, true)];
        let mut specs = vec![root.clone()];
        let mut emitted: HashMap<String, usize> = HashMap::new();
        emitted.insert(clean_name(&root.name), 0);
        let mut unresolved = Vec::new();
        self.enter(Phase::RootResolved);

        let mut parents = vec![0usize];
        for layer in 0..self.max_depth {
            if parents.is_empty() {
                break;
            }
            self.enter(Phase::Expanding(layer));
            // Modules first reached in this layer; expanded in the next one.
            let mut next = Vec::new();

            for parent in parents {
                let requirements = specs[parent].runtime_dependencies.clone();
                for requirement in requirements {
                    let spec = match self.lookup.lookup(&requirement) {
                        Ok(spec) => spec,
                        Err(e) => {
                            tracing::warn!("{}: {e}", modules[parent].name);
                            unresolved.push(Unresolved {
                                parent: modules[parent].name.clone(),
                                requirement: requirement.trim().to_string(),
                            });
                            continue;
                        }
                    };

                    let name = clean_name(&spec.name);
                    let child = match emitted.get(&name) {
                        Some(&idx) => idx,
                        None => {
                            let idx = modules.len();
                            modules.push(Module::from_spec(&spec, false));
                            specs.push(spec);
                            emitted.insert(name, idx);
                            next.push(idx);
                            idx
                        }
                    };
                    if child != parent {
                        let snapshot = modules[child].snapshot();
                        modules[parent].add_child(&snapshot);
                    }
                }
            }
            parents = next;
        }

        self.enter(Phase::Done);
        Resolution {
            modules,
            unresolved,
        }
    }
}
