//! TaskMetadata - タスク型ごとの宣言（登録時に作成、以後 read-only）

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::domain::errors::SchemaError;
use crate::options::OptionSpec;

/// Allowed-types entry that admits any entity type.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub allowed_types: BTreeSet<String>,
    pub allowed_options: Vec<OptionSpec>,
}

impl TaskMetadata {
    pub fn builder(name: impl Into<String>) -> TaskMetadataBuilder {
        TaskMetadataBuilder {
            metadata: TaskMetadata {
                name: name.into(),
                version: "1.0".to_string(),
                description: String::new(),
                allowed_types: BTreeSet::new(),
                allowed_options: Vec::new(),
            },
        }
    }

    /// `"name: version"`
    pub fn canonical_name(&self) -> String {
        format!("{}: {}", self.name, self.version)
    }

    pub fn accepts(&self, entity_type: &str) -> bool {
        self.allowed_types.contains(entity_type) || self.allowed_types.contains(WILDCARD)
    }

    /// Option 名が schema 内で一意であることを確認
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for spec in &self.allowed_options {
            if !seen.insert(spec.name()) {
                return Err(SchemaError::DuplicateOption(spec.name().to_string()));
            }
        }
        Ok(())
    }
}

pub struct TaskMetadataBuilder {
    metadata: TaskMetadata,
}

impl TaskMetadataBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.metadata.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    pub fn allow_type(mut self, entity_type: impl Into<String>) -> Self {
        self.metadata.allowed_types.insert(entity_type.into());
        self
    }

    pub fn allow_any_type(self) -> Self {
        self.allow_type(WILDCARD)
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.metadata.allowed_options.push(spec);
        self
    }

    pub fn build(self) -> Result<TaskMetadata, SchemaError> {
        self.metadata.validate()?;
        Ok(self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OptionType, ValidationRule};

    fn count() -> OptionSpec {
        OptionSpec::new("count", OptionType::Integer, ValidationRule::Integer, 1_i64).unwrap()
    }

    #[test]
    fn accepts_listed_types_only() {
        let meta = TaskMetadata::builder("dns_forward_lookup")
            .allow_type("DnsRecord")
            .build()
            .unwrap();
        assert!(meta.accepts("DnsRecord"));
        assert!(!meta.accepts("IpAddress"));
    }

    #[test]
    fn wildcard_accepts_everything() {
        let meta = TaskMetadata::builder("example").allow_any_type().build().unwrap();
        assert!(meta.accepts("Anything"));
    }

    #[test]
    fn duplicate_option_names_are_rejected() {
        let err = TaskMetadata::builder("example")
            .option(count())
            .option(count())
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateOption("count".to_string()));
    }

    #[test]
    fn canonical_name_includes_version() {
        let meta = TaskMetadata::builder("example").version("2.1").build().unwrap();
        assert_eq!(meta.canonical_name(), "example: 2.1");
    }
}
