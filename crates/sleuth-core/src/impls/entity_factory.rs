//! KnownTypesFactory - 型名の一覧だけで判定する EntityFactory
//!
//! entity 型ごとの本格的な検証は外部に任せる前提の最小実装。
//! - 型名が既知であること
//! - `name` 属性が空でないこと

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::Entity;
use crate::ports::EntityFactory;

/// Entity types known out of the box.
pub const DEFAULT_ENTITY_TYPES: &[&str] = &[
    "DnsRecord",
    "EmailAddress",
    "Host",
    "IpAddress",
    "Ipv6Address",
    "NetBlock",
    "NetSvc",
    "Organization",
    "Person",
    "PhysicalLocation",
    "String",
    "Uri",
];

#[derive(Debug, Clone)]
pub struct KnownTypesFactory {
    types: BTreeSet<String>,
}

impl KnownTypesFactory {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn knows(&self, entity_type: &str) -> bool {
        self.types.contains(entity_type)
    }
}

impl Default for KnownTypesFactory {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_TYPES.iter().copied())
    }
}

impl EntityFactory for KnownTypesFactory {
    fn create_by_type(
        &self,
        entity_type: &str,
        attributes: BTreeMap<String, String>,
    ) -> Option<Entity> {
        if !self.knows(entity_type) {
            return None;
        }
        let has_name = attributes
            .get("name")
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            return None;
        }
        Some(Entity::new(entity_type, attributes))
    }
}
