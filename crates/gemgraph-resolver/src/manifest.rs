//! Locating a project's manifest and keeping its Gemfile in place.

use std::path::{Path, PathBuf};

use gemgraph_core::config::ManifestMode;
use gemgraph_util::errors::{GemgraphError, GemgraphResult};

/// Bundler's lockfile name, which selects lock mode when present.
pub const GEMFILE_LOCK: &str = "Gemfile.lock";

pub const GEMFILE: &str = "Gemfile";

/// Written when a project has a gemspec but no Gemfile.
const MINIMAL_GEMFILE: &str = "source \"https://rubygems.org\"\n\ngemspec\n";

/// Find the first file in `dir` whose extension matches `mode`.
///
/// Entries are checked in file-name order so the result does not depend on
/// directory iteration order. In lock mode a `Gemfile.lock` wins over any
/// other `*.lock` file, such as a `Cargo.lock` in a mixed project.
pub fn find_manifest(dir: &Path, mode: ManifestMode) -> GemgraphResult<PathBuf> {
    let files = gemgraph_util::fs::list_files(dir)?;
    let mut matching = files
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(mode.extension()))
        .peekable();
    let first = matching.peek().cloned();
    let preferred = match mode {
        ManifestMode::Lock => {
            matching.find(|p| p.file_name().and_then(|n| n.to_str()) == Some(GEMFILE_LOCK))
        }
        ManifestMode::Spec => None,
    };
    preferred
        .or(first)
        .ok_or_else(|| GemgraphError::ManifestNotFound {
            dir: dir.to_path_buf(),
            mode: mode.to_string(),
        })
}

/// Lock mode when a `Gemfile.lock` exists, spec mode otherwise.
pub fn detect_mode(dir: &Path) -> ManifestMode {
    if dir.join(GEMFILE_LOCK).is_file() {
        ManifestMode::Lock
    } else {
        ManifestMode::Spec
    }
}

/// Write a minimal Gemfile into `dir` if there is none.
///
/// Returns `true` when a file was created. `bundle install` refuses to run
/// without one, so later installation steps depend on it existing.
pub fn ensure_gemfile(dir: &Path) -> GemgraphResult<bool> {
    let path = dir.join(GEMFILE);
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(&path, MINIMAL_GEMFILE).map_err(|e| GemgraphError::filesystem(&path, e))?;
    tracing::info!("created minimal {}", path.display());
    Ok(true)
}

/// Look for `VERSION = "x.y.z"` under `lib/`, for gemspecs that assign
/// `spec.version = Foo::VERSION`.
pub fn find_version_constant(project_root: &Path) -> Option<String> {
    let lib = project_root.join("lib");
    let mut candidates = Vec::new();
    collect_version_files(&lib, 0, &mut candidates);
    candidates.sort();
    candidates.iter().find_map(|path| {
        let content = std::fs::read_to_string(path).ok()?;
        content.lines().find_map(version_assignment)
    })
}

fn collect_version_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > 3 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_version_files(&path, depth + 1, out);
        } else if path.file_name().and_then(|n| n.to_str()) == Some("version.rb") {
            out.push(path);
        }
    }
}

fn version_assignment(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("VERSION")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim();
    let rest = rest.replace(".freeze", "");
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &rest[1..];
    let end = body.find(quote)?;
    Some(body[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn gemfile_lock_wins_over_other_lockfiles() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Cargo.lock"), "version = 3\n").unwrap();
        std::fs::write(tmp.path().join(GEMFILE_LOCK), "GEM\n").unwrap();

        let found = find_manifest(tmp.path(), ManifestMode::Lock).unwrap();
        assert_eq!(found, tmp.path().join(GEMFILE_LOCK));
    }

    #[test]
    fn gemspec_is_first_by_name() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.gemspec"), "").unwrap();
        std::fs::write(tmp.path().join("a.gemspec"), "").unwrap();
        std::fs::write(tmp.path().join("Cargo.lock"), "").unwrap();

        let found = find_manifest(tmp.path(), ManifestMode::Spec).unwrap();
        assert_eq!(found, tmp.path().join("a.gemspec"));
    }

    #[test]
    fn version_assignment_forms() {
        assert_eq!(
            version_assignment("  VERSION = \"1.2.3\""),
            Some("1.2.3".to_string())
        );
        assert_eq!(
            version_assignment("VERSION = '0.1.0'.freeze"),
            Some("0.1.0".to_string())
        );
        assert_eq!(version_assignment("MAJOR = 1"), None);
        assert_eq!(version_assignment("VERSION = [1, 2].join('.')"), None);
    }
}
