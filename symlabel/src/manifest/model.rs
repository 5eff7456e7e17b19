//! Manifest data model

use serde::{Deserialize, Deserializer};

/// A single recovered function
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolEntry {
    /// Fully qualified name, e.g. `main.(*Server).Serve`
    #[serde(rename = "FullName")]
    pub name: String,

    /// Address as recorded against the image's preferred base
    #[serde(rename = "Start")]
    pub static_address: u64,

    #[serde(rename = "End", default)]
    pub end: Option<u64>,

    #[serde(rename = "PackageName", default)]
    pub package: Option<String>,
}

impl SymbolEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, static_address: u64) -> Self {
        Self { name: name.into(), static_address, end: None, package: None }
    }
}

/// Parsed symbol manifest
///
/// Unknown top-level keys (`Types`, `Interfaces`, `TabMeta`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SymbolManifest {
    #[serde(rename = "Version", default)]
    pub version: Option<String>,

    #[serde(rename = "BuildId", default)]
    pub build_id: Option<String>,

    #[serde(rename = "UserFunctions", default, deserialize_with = "null_as_empty")]
    pub user_functions: Vec<SymbolEntry>,

    #[serde(rename = "StdFunctions", default, deserialize_with = "null_as_empty")]
    pub std_functions: Vec<SymbolEntry>,
}

impl SymbolManifest {
    /// Total number of entries across both collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.user_functions.len() + self.std_functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SymbolEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SymbolEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_collections_are_empty() {
        let manifest: SymbolManifest =
            serde_json::from_str(r#"{"UserFunctions":null,"StdFunctions":null}"#).unwrap();
        assert!(manifest.user_functions.is_empty());
        assert!(manifest.std_functions.is_empty());
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let manifest: SymbolManifest = serde_json::from_str(r#"{"Version":"1.21.4"}"#).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.21.4"));
        assert_eq!(manifest.len(), 0);
    }

    #[test]
    fn test_entry_extra_fields() {
        let manifest: SymbolManifest = serde_json::from_str(
            r#"{"UserFunctions":[{"Start":4198400,"End":4198480,
                                  "PackageName":"main","FullName":"main.foo"}],
                "Types":[],"TabMeta":{"VA":1}}"#,
        )
        .unwrap();
        let entry = &manifest.user_functions[0];
        assert_eq!(entry.name, "main.foo");
        assert_eq!(entry.static_address, 0x0040_1000);
        assert_eq!(entry.end, Some(4_198_480));
        assert_eq!(entry.package.as_deref(), Some("main"));
    }

    #[test]
    fn test_entry_requires_start() {
        let result: Result<SymbolManifest, _> =
            serde_json::from_str(r#"{"UserFunctions":[{"FullName":"main.foo"}]}"#);
        assert!(result.is_err());
    }
}
