//! SHA-256 checksums of packaged `.gem` archives.
//!
//! Linux and macOS hash through the platform checksum utility; every other
//! host (and any host where the utility is missing) hashes in-process.

use std::path::Path;

use gemgraph_util::errors::{GemgraphError, GemgraphResult};
use gemgraph_util::hash::sha256_file;
#[cfg(any(target_os = "linux", target_os = "macos"))]
use gemgraph_util::{hash::extract_digest, process::CommandBuilder};

/// Path component that marks a RubyGems package cache.
pub const CACHE_MARKER: &str = "cache";

/// Compute the SHA-256 of `<cache_dir>/<stem>.gem`.
///
/// Returns `Ok(None)` without touching the filesystem when `cache_dir` is
/// not a package cache (no `cache` path component). A cache directory
/// without the archive yields [`GemgraphError::ChecksumUnavailable`].
pub fn compute_checksum(cache_dir: &Path, stem: &str) -> GemgraphResult<Option<String>> {
    if !is_cache_dir(cache_dir) {
        return Ok(None);
    }
    let archive = cache_dir.join(format!("{stem}.gem"));
    if !archive.is_file() {
        return Err(GemgraphError::ChecksumUnavailable { path: archive });
    }
    let digest = match platform_digest(&archive) {
        Ok(digest) => digest,
        Err(e) => {
            tracing::debug!("{e}; hashing {} in-process", archive.display());
            sha256_file(&archive).map_err(|e| GemgraphError::filesystem(&archive, e))?
        }
    };
    Ok(Some(digest))
}

/// Whether `dir` looks like a RubyGems package cache.
pub fn is_cache_dir(dir: &Path) -> bool {
    dir.components()
        .any(|c| c.as_os_str().to_str() == Some(CACHE_MARKER))
}

#[cfg(target_os = "linux")]
fn platform_digest(archive: &Path) -> GemgraphResult<String> {
    tool_digest(CommandBuilder::new("sha256sum").arg(archive.to_string_lossy()))
}

#[cfg(target_os = "macos")]
fn platform_digest(archive: &Path) -> GemgraphResult<String> {
    tool_digest(
        CommandBuilder::new("shasum")
            .args(["-a", "256"])
            .arg(archive.to_string_lossy()),
    )
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_digest(archive: &Path) -> GemgraphResult<String> {
    sha256_file(archive).map_err(|e| GemgraphError::filesystem(archive, e))
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn tool_digest(cmd: CommandBuilder) -> GemgraphResult<String> {
    let stdout = cmd.exec_stdout()?;
    extract_digest(&stdout).ok_or_else(|| GemgraphError::Parse {
        message: format!("unexpected checksum output: {}", stdout.trim()),
    })
}
