use std::path::PathBuf;

use serde::Serialize;

/// One parsed gemspec.
///
/// Produced by the gemspec parser from a single file and treated as
/// read-only afterwards. Dependency fields hold the raw requirement strings
/// (e.g. `"rake", ">= 10.0"`); they are resolved against the installed gem
/// cache later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Spec {
    pub name: String,
    pub version: String,
    pub license: String,
    pub licenses: Vec<String>,
    pub license_text: String,
    pub install_dir: Option<PathBuf>,
    pub copyright: String,
    pub checksum: String,
    pub homepage: String,
    pub authors: Vec<String>,
    pub emails: Vec<String>,
    pub summary: String,
    pub description: String,
    pub runtime_dependencies: Vec<String>,
    pub development_dependencies: Vec<String>,
    /// Specs discovered alongside this one; only used while scanning.
    #[serde(skip)]
    pub children: Vec<Spec>,
}

impl Spec {
    /// `name-version`, the stem shared by the `.gemspec`, `.gem` and install directory.
    pub fn versioned_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}-{}", self.name, self.version)
        }
    }

    /// All declared licenses, merging the scalar `license` with the `licenses` list.
    pub fn all_licenses(&self) -> Vec<String> {
        let mut all = Vec::new();
        if !self.license.is_empty() {
            all.push(self.license.clone());
        }
        for l in &self.licenses {
            if !all.contains(l) {
                all.push(l.clone());
            }
        }
        all
    }
}

/// Normalize a raw gem name taken from a manifest or tool output.
///
/// Strips quotes, whitespace, a trailing `.freeze`, and any version suffix
/// in parentheses. Case is preserved.
pub fn clean_name(raw: &str) -> String {
    let mut name = raw.trim();
    if let Some(idx) = name.find('(') {
        name = &name[..idx];
    }
    let name = name.trim().trim_end_matches(".freeze");
    name.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
        .to_string()
}
