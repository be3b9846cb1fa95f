use gemgraph_resolver::gemspec::{parse_gemspec, parse_gemspec_file};

/// The normalized form RubyGems writes to `specifications/`.
const INSTALLED: &str = r#"# -*- encoding: utf-8 -*-
# stub: rack-test 2.1.0 ruby lib

Gem::Specification.new do |s|
  s.name = "rack-test".freeze
  s.version = "2.1.0"

  s.required_rubygems_version = Gem::Requirement.new(">= 0".freeze) if s.respond_to? :required_rubygems_version=
  s.metadata = { "changelog_uri" => "https://github.com/rack/rack-test/blob/main/History.md" } if s.respond_to? :metadata=
  s.require_paths = ["lib".freeze]
  s.authors = ["Jeremy Evans".freeze, "Bryan Helmkamp".freeze]
  s.date = "2023-02-24"
  s.email = ["code@jeremyevans.net".freeze]
  s.homepage = "https://github.com/rack/rack-test".freeze
  s.licenses = ["MIT".freeze]
  s.rubygems_version = "3.3.5".freeze
  s.summary = "Simple testing API built on Rack".freeze

  s.installed_by_version = "3.3.5" if s.respond_to? :installed_by_version

  s.specification_version = 4

  s.add_runtime_dependency(%q<rack>.freeze, [">= 1.3"])
  s.add_runtime_dependency(%q<rack>.freeze, [">= 1.3"])
  s.add_development_dependency(%q<rake>.freeze, [">= 0"])
end
"#;

/// The hand-written form found in a project root.
const PROJECT: &str = r##"# frozen_string_literal: true

require_relative "lib/demo/version"

Gem::Specification.new do |gem|
  gem.name          = "demo"
  gem.version       = Demo::VERSION
  gem.authors       = ["Jane Doe"]
  gem.email         = ["jane@example.com"]

  gem.summary       = "Demo gem"
  gem.description   = <<~DESC
    A longer description that spans lines.
  DESC
  gem.homepage      = "https://example.com/demo"
  gem.license       = "MIT"
  gem.metadata["source_code_uri"] = "#{gem.homepage}/src"

  gem.files = Dir["lib/**/*.rb"]

  gem.add_dependency "rake", ">= 10.0"
  gem.add_dependency "thor", "~> 1.2", "< 2" # cli
  gem.add_dependency "rake", ">= 10.0"
  gem.add_development_dependency "rspec", "~> 3.0"
end
"##;

#[test]
fn installed_gemspec_fields() {
    let spec = parse_gemspec(INSTALLED);
    assert_eq!(spec.name, "rack-test");
    assert_eq!(spec.version, "2.1.0");
    assert_eq!(spec.authors, vec!["Jeremy Evans", "Bryan Helmkamp"]);
    assert_eq!(spec.emails, vec!["code@jeremyevans.net"]);
    assert_eq!(spec.homepage, "https://github.com/rack/rack-test");
    assert_eq!(spec.licenses, vec!["MIT"]);
    assert_eq!(spec.summary, "Simple testing API built on Rack");
}

#[test]
fn installed_gemspec_dependencies_are_deduplicated() {
    let spec = parse_gemspec(INSTALLED);
    assert_eq!(spec.runtime_dependencies, vec!["\"rack\", \">= 1.3\""]);
    assert_eq!(spec.development_dependencies, vec!["\"rake\", \">= 0\""]);
}

#[test]
fn project_gemspec_with_block_variable() {
    let spec = parse_gemspec(PROJECT);
    assert_eq!(spec.name, "demo");
    assert_eq!(spec.version, "Demo::VERSION");
    assert_eq!(spec.license, "MIT");
    assert_eq!(spec.description, "");
    assert_eq!(
        spec.runtime_dependencies,
        vec!["\"rake\", \">= 10.0\"", "\"thor\", \"~> 1.2\", \"< 2\""]
    );
    assert_eq!(spec.development_dependencies, vec!["\"rspec\", \"~> 3.0\""]);
}

#[test]
fn parsing_is_deterministic() {
    assert_eq!(parse_gemspec(INSTALLED), parse_gemspec(INSTALLED));
    assert_eq!(parse_gemspec(PROJECT), parse_gemspec(PROJECT));
}

#[test]
fn parse_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rack-test-2.1.0.gemspec");
    std::fs::write(&path, INSTALLED).unwrap();
    let spec = parse_gemspec_file(&path).unwrap();
    assert_eq!(spec, parse_gemspec(INSTALLED));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(parse_gemspec_file(&dir.path().join("nope.gemspec")).is_err());
}
