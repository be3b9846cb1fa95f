use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn gemgraph_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gemgraph").unwrap();
    // keep a developer's ~/.gemgraph/config.toml out of the tests
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn install_rake(gem_home: &Path) {
    fs::create_dir_all(gem_home.join("specifications")).unwrap();
    fs::write(
        gem_home.join("specifications/rake-13.0.6.gemspec"),
        "Gem::Specification.new do |s|\n  s.name = \"rake\".freeze\n  s.version = \"13.0.6\"\n  s.licenses = [\"MIT\".freeze]\nend\n",
    )
    .unwrap();
    fs::create_dir_all(gem_home.join("cache")).unwrap();
    fs::write(gem_home.join("cache/rake-13.0.6.gem"), b"hello world").unwrap();
}

fn demo_project(root: &Path) {
    fs::write(
        root.join("demo.gemspec"),
        "Gem::Specification.new do |spec|\n  spec.name = \"demo\"\n  spec.version = \"0.1.0\"\n  spec.add_dependency \"rake\", \">= 10.0\"\nend\n",
    )
    .unwrap();
}

struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new(with_rake: bool) -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("project")).unwrap();
        fs::create_dir_all(tmp.path().join("gems/specifications")).unwrap();
        demo_project(&tmp.path().join("project"));
        if with_rake {
            install_rake(&tmp.path().join("gems"));
        }
        Self { tmp }
    }

    fn project(&self) -> std::path::PathBuf {
        self.tmp.path().join("project")
    }

    fn gems(&self) -> String {
        self.tmp.path().join("gems").display().to_string()
    }

    fn cmd(&self) -> Command {
        gemgraph_cmd(self.tmp.path())
    }
}

#[test]
fn test_resolve_json() {
    let fx = Fixture::new(true);

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"demo\""))
        .stdout(predicate::str::contains("\"name\": \"rake\""))
        .stdout(predicate::str::contains(
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
        ))
        .stdout(predicate::str::contains("pkg:gem/rake@13.0.6"));
}

#[test]
fn test_resolve_tree_with_path_argument() {
    let fx = Fixture::new(true);

    fx.cmd()
        .args(["resolve"])
        .arg(fx.project())
        .args(["--gem-path", &fx.gems(), "--format", "tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo v0.1.0"))
        .stdout(predicate::str::contains("└── rake v13.0.6"))
        .stderr(predicate::str::contains("1 dependencies, depth 1"));
}

#[test]
fn test_resolve_reports_unresolved() {
    let fx = Fixture::new(false);

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"demo\""))
        .stdout(predicate::str::contains("\"name\": \"rake\"").not())
        .stderr(predicate::str::contains("Unresolved"))
        .stderr(predicate::str::contains("rake"));
}

#[test]
fn test_resolve_depth_zero() {
    let fx = Fixture::new(true);

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--depth", "0", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"rake\"").not());
}

#[test]
fn test_resolve_why() {
    let fx = Fixture::new(true);

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--why", "rake", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path to rake:"))
        .stdout(predicate::str::contains("demo v0.1.0"))
        .stdout(predicate::str::contains("  rake v13.0.6"));
}

#[test]
fn test_resolve_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    gemgraph_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["resolve", "--gem-path", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No spec manifest found"));
}

#[test]
fn test_resolve_rejects_unknown_mode() {
    let fx = Fixture::new(true);

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--mode", "yaml", "--gem-path", &fx.gems()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'yaml' for '--mode"));
}

#[test]
fn test_resolve_forced_lock_mode() {
    let fx = Fixture::new(true);
    fs::write(
        fx.project().join("Gemfile.lock"),
        "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n\nDEPENDENCIES\n  rake\n",
    )
    .unwrap();
    fs::write(fx.project().join("Cargo.lock"), "version = 3\n").unwrap();

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--mode", "lock", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"rake\""))
        .stdout(predicate::str::contains("\"version\": \"13.0.6\""));
}

#[test]
fn test_resolve_respects_project_config() {
    let fx = Fixture::new(true);
    fs::write(fx.project().join(".gemgraph.toml"), "max-depth = 0\n").unwrap();

    fx.cmd()
        .current_dir(fx.project())
        .args(["resolve", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"rake\"").not());
}

#[test]
fn test_roots_lists_gem_paths() {
    let fx = Fixture::new(false);
    fs::create_dir_all(fx.project().join("vendor/bundle/ruby/3.2.0")).unwrap();

    fx.cmd()
        .current_dir(fx.project())
        .args(["roots", "--gem-path", &fx.gems()])
        .assert()
        .success()
        .stdout(predicate::str::contains("vendor"))
        .stdout(predicate::str::contains("gem-path"))
        .stdout(predicate::str::contains(fx.gems()));
}
