use std::path::PathBuf;

use gemgraph_util::errors::GemgraphError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = GemgraphError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_not_found_display() {
    let err = GemgraphError::ManifestNotFound {
        dir: PathBuf::from("/tmp/project"),
        mode: "spec".to_string(),
    };
    assert_eq!(err.to_string(), "No spec manifest found in /tmp/project");
}

#[test]
fn test_descendant_unresolved_display() {
    let err = GemgraphError::DescendantUnresolved {
        requirement: "\"rake\", \">= 10.0\"".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Unresolved dependency: \"rake\", \">= 10.0\""
    );
}

#[test]
fn test_filesystem_error_keeps_path() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = GemgraphError::filesystem("/var/lib/gems/specifications", io_err);
    let msg = err.to_string();
    assert!(msg.contains("/var/lib/gems/specifications"), "got: {msg}");
    assert!(msg.contains("denied"), "got: {msg}");
}

#[test]
fn test_command_error_display() {
    let err = GemgraphError::Command {
        program: "gem".to_string(),
        message: "not found".to_string(),
    };
    assert_eq!(err.to_string(), "Command `gem` failed: not found");
}

#[test]
fn test_config_error_display() {
    let err = GemgraphError::Config {
        message: "bad key".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: bad key");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: GemgraphError = io_err.into();
    assert!(matches!(err, GemgraphError::Io(_)));
}
