//! Entity - タスクが扱う型付きレコード

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed record (type + attribute map) that tasks operate on and produce.
///
/// Attributes are kept in a `BTreeMap` so the serialized form is canonical:
/// two entities with the same type and attributes always serialize to the
/// same text, which is what result de-duplication compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            attributes,
        }
    }

    /// Convenience constructor for the common `{ name: ... }` entity.
    pub fn named(entity_type: impl Into<String>, name: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("name".to_string(), name.into());
        Self::new(entity_type, attributes)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute("name")
    }

    /// Canonical JSON text of this entity.
    pub fn to_json(&self) -> String {
        // BTreeMap<String, String> と String だけなので失敗しない
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
