use gemgraph_core::config::{dirs_path, ManifestMode, ResolverConfig, PROJECT_CONFIG_FILE};
use gemgraph_core::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_max_depth_is_three() {
    let config = ResolverConfig::default();
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.max_depth, 3);
}

#[test]
fn test_default_gem_command() {
    assert_eq!(ResolverConfig::default().gem_command, "gem");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = ResolverConfig::parse_toml("").unwrap();
    assert_eq!(config, ResolverConfig::default());
    assert!(config.repair_gemfile);
}

#[test]
fn test_parse_full_toml() {
    let toml = r#"
max-depth = 5
gem-command = "/opt/ruby/bin/gem"
mode = "lock"
repair-gemfile = false
extra-roots = ["/srv/gems"]
"#;
    let config = ResolverConfig::parse_toml(toml).unwrap();
    assert_eq!(config.max_depth, 5);
    assert_eq!(config.gem_command, "/opt/ruby/bin/gem");
    assert_eq!(config.mode, Some(ManifestMode::Lock));
    assert!(!config.repair_gemfile);
    assert_eq!(config.extra_roots, vec![PathBuf::from("/srv/gems")]);
}

#[test]
fn test_overlay_only_touches_present_keys() {
    let mut config = ResolverConfig {
        gem_command: "gem3".to_string(),
        ..Default::default()
    };
    config.overlay_toml("max-depth = 1\n").unwrap();
    assert_eq!(config.max_depth, 1);
    assert_eq!(config.gem_command, "gem3");
}

#[test]
fn test_project_file_overlay() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(PROJECT_CONFIG_FILE), "mode = \"spec\"\n").unwrap();
    let mut config = ResolverConfig::default();
    config
        .overlay_file(&tmp.path().join(PROJECT_CONFIG_FILE))
        .unwrap();
    assert_eq!(config.mode, Some(ManifestMode::Spec));
}

#[test]
fn test_overlay_missing_file_is_noop() {
    let tmp = TempDir::new().unwrap();
    let mut config = ResolverConfig::default();
    config.overlay_file(&tmp.path().join("absent.toml")).unwrap();
    assert_eq!(config, ResolverConfig::default());
}

#[test]
fn test_overlay_invalid_file_is_config_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(PROJECT_CONFIG_FILE);
    std::fs::write(&path, "max-depth = \"deep\"\n").unwrap();
    let mut config = ResolverConfig::default();
    let err = config.overlay_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Config error"), "got: {err}");
}

#[test]
fn test_unknown_mode_is_rejected() {
    let err = ResolverConfig::parse_toml("mode = \"yaml\"\n").unwrap_err();
    assert!(err.to_string().starts_with("Config error"), "got: {err}");
}

#[test]
fn test_manifest_mode_extension() {
    assert_eq!(ManifestMode::Spec.extension(), "gemspec");
    assert_eq!(ManifestMode::Lock.extension(), "lock");
}

#[test]
fn test_dirs_path_contains_gemgraph() {
    assert!(dirs_path().ends_with(".gemgraph"));
}
