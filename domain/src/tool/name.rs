//! Tool name sanitizing and the API-name alias map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Convert a dotted tool name into the character set model APIs accept.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`, so `file.read`
/// is exposed as `file_read`.
pub fn sanitize_tool_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized API name → canonical dotted name.
///
/// Built per turn for the tools offered to the model, and merged with any
/// aliases a remote discovery service supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(BTreeMap<String, String>);

impl AliasMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build the map for a set of canonical names.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for name in names {
            map.register(name);
        }
        map
    }

    /// Register a canonical name under its sanitized alias.
    ///
    /// An alias already pointing at another name is left untouched.
    pub fn register(&mut self, canonical: &str) {
        self.0
            .entry(sanitize_tool_name(canonical))
            .or_insert_with(|| canonical.to_string());
    }

    pub fn insert(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.0.insert(alias.into(), canonical.into());
    }

    /// Merge another map into this one. Existing entries win.
    pub fn merge(&mut self, other: &AliasMap) {
        for (alias, canonical) in &other.0 {
            self.0
                .entry(alias.clone())
                .or_insert_with(|| canonical.clone());
        }
    }

    /// Resolve an alias to its canonical name (aliases only).
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(|s| s.as_str())
    }

    /// Resolve an alias, or return the name unchanged when it is not one.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.resolve(name).unwrap_or(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
