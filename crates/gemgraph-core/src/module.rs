//! The ecosystem-agnostic output record consumed by SBOM serializers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::spec::Spec;
use crate::CHECKSUM_NONE;

/// Who supplies a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierKind {
    #[default]
    Person,
    Organization,
}

/// Supplier contact derived from a gem's first author and email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Supplier {
    pub kind: SupplierKind,
    pub name: String,
    pub email: String,
}

/// Hash algorithm of a [`Checksum`]. Gems are only ever hashed with SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ChecksumAlgorithm {
    #[default]
    #[serde(rename = "SHA256")]
    Sha256,
}

/// A package checksum. `value` is a lowercase hex digest or [`CHECKSUM_NONE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl Checksum {
    /// A SHA-256 checksum, falling back to the `NONE` sentinel for an empty digest.
    pub fn sha256(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            algorithm: ChecksumAlgorithm::Sha256,
            value: if value.is_empty() {
                CHECKSUM_NONE.to_string()
            } else {
                value
            },
        }
    }

    pub fn none() -> Self {
        Self::sha256("")
    }

    pub fn is_none(&self) -> bool {
        self.value == CHECKSUM_NONE
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::none()
    }
}

/// One package in the output graph.
///
/// `modules` maps a child gem name to a snapshot of that child taken when
/// the edge was added. Snapshots are owned copies, never references into
/// the cache, so a dependency cycle yields a repeated node, not an infinite
/// structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub version: String,
    pub root: bool,
    pub path: Option<PathBuf>,
    pub supplier: Supplier,
    pub package_url: String,
    pub package_home_page: String,
    pub package_download_location: String,
    pub license_declared: String,
    pub license_concluded: String,
    pub copyright: String,
    pub checksum: Checksum,
    pub comments: String,
    pub modules: BTreeMap<String, Module>,
}

impl Module {
    /// Build a module from a parsed spec. Children are added separately.
    pub fn from_spec(spec: &Spec, root: bool) -> Self {
        let licenses = spec.all_licenses().join(" OR ");
        let homepage = spec.homepage.clone();
        Self {
            name: spec.name.clone(),
            version: spec.version.clone(),
            root,
            path: spec.install_dir.clone(),
            supplier: Supplier {
                kind: SupplierKind::Person,
                name: spec.authors.first().cloned().unwrap_or_default(),
                email: spec.emails.first().cloned().unwrap_or_default(),
            },
            package_url: package_url(&spec.name, &spec.version),
            package_download_location: if homepage.is_empty() {
                rubygems_url(&spec.name, &spec.version)
            } else {
                homepage.clone()
            },
            package_home_page: homepage,
            license_declared: licenses.clone(),
            license_concluded: licenses,
            copyright: spec.copyright.clone(),
            checksum: Checksum::sha256(spec.checksum.clone()),
            comments: spec.summary.clone(),
            modules: BTreeMap::new(),
        }
    }

    /// Record a direct dependency edge. Returns `false` if a child with the
    /// same name is already present; the existing entry is kept.
    pub fn add_child(&mut self, child: &Module) -> bool {
        if self.modules.contains_key(&child.name) {
            return false;
        }
        self.modules.insert(child.name.clone(), child.snapshot());
        true
    }

    /// A copy of this module without its own children.
    pub fn snapshot(&self) -> Module {
        Module {
            name: self.name.clone(),
            version: self.version.clone(),
            root: self.root,
            path: self.path.clone(),
            supplier: self.supplier.clone(),
            package_url: self.package_url.clone(),
            package_home_page: self.package_home_page.clone(),
            package_download_location: self.package_download_location.clone(),
            license_declared: self.license_declared.clone(),
            license_concluded: self.license_concluded.clone(),
            copyright: self.copyright.clone(),
            checksum: self.checksum.clone(),
            comments: self.comments.clone(),
            modules: BTreeMap::new(),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} v{}", self.name, self.version)
        }
    }
}

/// Package URL (`pkg:gem/name@version`).
pub fn package_url(name: &str, version: &str) -> String {
    if version.is_empty() {
        format!("pkg:gem/{name}")
    } else {
        format!("pkg:gem/{name}@{version}")
    }
}

fn rubygems_url(name: &str, version: &str) -> String {
    if version.is_empty() {
        format!("https://rubygems.org/gems/{name}")
    } else {
        format!("https://rubygems.org/gems/{name}/versions/{version}")
    }
}
