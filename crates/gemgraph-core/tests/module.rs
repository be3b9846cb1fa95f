use gemgraph_core::module::{Checksum, Module, SupplierKind};
use gemgraph_core::spec::Spec;
use gemgraph_core::CHECKSUM_NONE;

fn rake() -> Spec {
    Spec {
        name: "rake".to_string(),
        version: "13.0.6".to_string(),
        licenses: vec!["MIT".to_string()],
        authors: vec!["Hiroshi SHIBATA".to_string(), "Eric Hodel".to_string()],
        emails: vec!["hsbt@ruby-lang.org".to_string()],
        homepage: "https://github.com/ruby/rake".to_string(),
        summary: "Rake is a Make-like program implemented in Ruby".to_string(),
        checksum: "a".repeat(64),
        ..Default::default()
    }
}

#[test]
fn test_from_spec_maps_fields() {
    let m = Module::from_spec(&rake(), false);
    assert_eq!(m.name, "rake");
    assert_eq!(m.version, "13.0.6");
    assert!(!m.root);
    assert_eq!(m.supplier.kind, SupplierKind::Person);
    assert_eq!(m.supplier.name, "Hiroshi SHIBATA");
    assert_eq!(m.supplier.email, "hsbt@ruby-lang.org");
    assert_eq!(m.license_declared, "MIT");
    assert_eq!(m.license_concluded, "MIT");
    assert_eq!(m.package_home_page, "https://github.com/ruby/rake");
    assert_eq!(m.package_download_location, "https://github.com/ruby/rake");
    assert_eq!(m.checksum.value, "a".repeat(64));
    assert!(m.modules.is_empty());
}

#[test]
fn test_multiple_licenses_are_alternatives() {
    let spec = Spec {
        name: "json".to_string(),
        license: "Ruby".to_string(),
        licenses: vec!["BSD-2-Clause".to_string()],
        ..Default::default()
    };
    let m = Module::from_spec(&spec, false);
    assert_eq!(m.license_declared, "Ruby OR BSD-2-Clause");
}

#[test]
fn test_checksum_sentinel() {
    assert_eq!(Checksum::none().value, CHECKSUM_NONE);
    assert_eq!(Checksum::sha256("").value, CHECKSUM_NONE);
    assert!(!Checksum::sha256("abc").is_none());
}

#[test]
fn test_module_serializes_to_json() {
    let mut root = Module::from_spec(
        &Spec {
            name: "demo".to_string(),
            version: "1.0.0".to_string(),
            ..Default::default()
        },
        true,
    );
    root.add_child(&Module::from_spec(&rake(), false));

    let json = serde_json::to_value(&root).unwrap();
    assert_eq!(json["name"], "demo");
    assert_eq!(json["root"], true);
    assert_eq!(json["checksum"]["algorithm"], "SHA256");
    assert_eq!(json["checksum"]["value"], CHECKSUM_NONE);
    assert_eq!(json["modules"]["rake"]["version"], "13.0.6");
    assert_eq!(json["supplier"]["kind"], "person");
}
