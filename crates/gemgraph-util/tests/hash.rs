use gemgraph_util::hash::{extract_digest, is_sha256_hex, sha256_bytes, sha256_file};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_sha256_bytes_empty() {
    let hash = sha256_bytes(b"");
    assert_eq!(
        hash,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_sha256_bytes_hello() {
    let hash = sha256_bytes(b"hello");
    assert_eq!(
        hash,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_sha256_file_matches_bytes() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"hello").unwrap();
    tmp.flush().unwrap();
    let file_hash = sha256_file(tmp.path()).unwrap();
    assert_eq!(file_hash, sha256_bytes(b"hello"));
}

#[test]
fn test_sha256_file_not_found() {
    let result = sha256_file(Path::new("/nonexistent/path/file.gem"));
    assert!(result.is_err());
}

#[test]
fn test_is_sha256_hex() {
    assert!(is_sha256_hex(&sha256_bytes(b"gem")));
    assert!(!is_sha256_hex("NONE"));
    assert!(!is_sha256_hex(""));
}

#[test]
fn test_extract_digest_from_tool_output() {
    let digest = sha256_bytes(b"hello");
    let output = format!("{digest}  /root/.gem/cache/rake-13.0.6.gem\n");
    assert_eq!(extract_digest(&output), Some(digest));
}

#[test]
fn test_extract_digest_rejects_garbage() {
    assert_eq!(extract_digest("sha256sum: no such file\n"), None);
    assert_eq!(extract_digest(""), None);
}
