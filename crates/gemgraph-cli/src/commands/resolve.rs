//! Handler for `gemgraph resolve`.

use std::path::{Path, PathBuf};

use gemgraph_core::config::ResolverConfig;
use gemgraph_util::progress;
use miette::{IntoDiagnostic, Result};

use crate::cli::{Format, Mode};

/// Options for `gemgraph resolve`.
pub struct ResolveOptions {
    pub depth: Option<usize>,
    pub mode: Option<Mode>,
    pub format: Format,
    pub gem_paths: Vec<PathBuf>,
    pub why: Option<String>,
}

pub async fn exec(project_root: &Path, opts: &ResolveOptions) -> Result<()> {
    let mut config = ResolverConfig::load(project_root)?;
    if let Some(depth) = opts.depth {
        config.max_depth = depth;
    }
    if let Some(mode) = opts.mode {
        config.mode = Some(mode.into());
    }
    tracing::debug!("effective config: {config:?}");

    let mut resolver = super::build_resolver(config, opts.gem_paths.clone());
    let pb = progress::spinner(&format!("Resolving {}", project_root.display()));
    let result = resolver.resolve(project_root).await;
    pb.finish_and_clear();
    let resolution = result?;

    for unresolved in &resolution.unresolved {
        progress::status_warn(
            "Unresolved",
            &format!("{} (required by {})", unresolved.requirement, unresolved.parent),
        );
    }

    let graph = resolution.graph();
    if let Some(target) = &opts.why {
        match graph.find_path(target) {
            Some(path) => {
                println!("Path to {target}:");
                for (i, node) in path.iter().enumerate() {
                    let indent = "  ".repeat(i);
                    println!("{indent}{node}");
                }
            }
            None => println!("Gem '{target}' not found in the graph."),
        }
        return Ok(());
    }

    match opts.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&resolution.modules).into_diagnostic()?;
            println!("{json}");
        }
        Format::Tree => print!("{}", graph.print_tree()),
    }

    if let Some(root) = resolution.root() {
        progress::status(
            "Resolved",
            &format!(
                "{root} ({} dependencies, depth {})",
                resolution.modules.len() - 1,
                graph.max_depth()
            ),
        );
    }
    Ok(())
}
