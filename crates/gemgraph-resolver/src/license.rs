//! Copyright extraction from LICENSE-like files.

use std::path::{Path, PathBuf};

use gemgraph_util::errors::{GemgraphError, GemgraphResult};

/// File-name markers, in order of preference.
const LICENSE_MARKERS: [&str; 6] = ["LICENSE", "LICENCE", "COPYING", "LGPL", "GPL", "PSFL"];

/// What was found in a gem's license file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    pub file: PathBuf,
    /// First line containing `Copyright (c)`, verbatim.
    pub copyright: Option<String>,
    pub text: String,
}

/// Find a license file directly inside `dir` and scan it for a copyright line.
///
/// Returns [`GemgraphError::LicenseNotFound`] when `dir` has no
/// LICENSE-like file. A license file without a copyright line is returned
/// with `copyright: None`.
pub fn find_license(dir: &Path) -> GemgraphResult<LicenseInfo> {
    let not_found = || GemgraphError::LicenseNotFound {
        dir: dir.to_path_buf(),
    };
    let files = gemgraph_util::fs::list_files(dir).map_err(|_| not_found())?;
    let file = pick_license_file(&files).ok_or_else(not_found)?;

    let bytes = std::fs::read(&file).map_err(|e| GemgraphError::filesystem(&file, e))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let copyright = copyright_line(&text);
    Ok(LicenseInfo {
        file,
        copyright,
        text,
    })
}

fn pick_license_file(files: &[PathBuf]) -> Option<PathBuf> {
    LICENSE_MARKERS.iter().find_map(|marker| {
        files
            .iter()
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_ascii_uppercase().contains(marker))
            })
            .cloned()
    })
}

/// The first line containing `Copyright (c)`, matched case-insensitively.
/// Only the line terminator is removed.
pub fn copyright_line(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.to_ascii_lowercase().contains("copyright (c)"))
        .map(str::to_string)
}
