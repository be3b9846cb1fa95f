use std::path::{Path, PathBuf};

use crate::errors::{GemgraphError, GemgraphResult};

/// List the regular files directly inside `dir`, sorted by file name.
///
/// A missing or unreadable directory is reported as
/// [`GemgraphError::Filesystem`] rather than panicking.
pub fn list_files(dir: &Path) -> GemgraphResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| GemgraphError::filesystem(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GemgraphError::filesystem(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a file into a string, attaching the path to any error.
pub fn read_to_string(path: &Path) -> GemgraphResult<String> {
    std::fs::read_to_string(path).map_err(|e| GemgraphError::filesystem(path, e))
}

/// The file name of `path` without its final extension, as UTF-8.
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
