//! Handler for `gemgraph roots`.

use std::path::{Path, PathBuf};

use console::Style;
use gemgraph_core::config::ResolverConfig;
use miette::Result;

pub fn exec(project_root: &Path, gem_paths: Vec<PathBuf>) -> Result<()> {
    let config = ResolverConfig::load(project_root)?;
    let resolver = super::build_resolver(config, gem_paths);
    let roots = resolver.roots(project_root)?;

    if roots.is_empty() {
        println!("No install roots found.");
        return Ok(());
    }

    let dim = Style::new().dim();
    for root in &roots {
        let note = if root.specifications_dir().is_dir() {
            String::new()
        } else {
            format!(" {}", dim.apply_to("(no specifications)"))
        };
        println!("{:<13} {}{note}", root.kind.to_string(), root.path.display());
    }
    Ok(())
}
