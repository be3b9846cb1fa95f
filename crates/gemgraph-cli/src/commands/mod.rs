//! Command dispatch and handler modules.

mod resolve;
mod roots;

use std::path::PathBuf;
use std::sync::Arc;

use gemgraph_core::config::ResolverConfig;
use gemgraph_resolver::env::StaticEnvironment;
use gemgraph_resolver::resolver::Resolver;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            path,
            depth,
            mode,
            format,
            gem_paths,
            why,
        } => {
            let opts = resolve::ResolveOptions {
                depth,
                mode,
                format,
                gem_paths,
                why,
            };
            resolve::exec(&path, &opts).await
        }
        Command::Roots { path, gem_paths } => roots::exec(&path, gem_paths),
    }
}

/// A resolver over `gem env`, or over `gem_paths` when any are given.
fn build_resolver(config: ResolverConfig, gem_paths: Vec<PathBuf>) -> Resolver {
    if gem_paths.is_empty() {
        Resolver::with_gem_cli(config)
    } else {
        Resolver::new(config, Arc::new(StaticEnvironment::new(gem_paths)))
    }
}
