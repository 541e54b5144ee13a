//! EntityFactory port - 派生 entity の生成と検証
//!
//! entity 型ごとの検証ロジック本体は外部のもの。core は
//! 「検証に通れば Entity、通らなければ None」という契約だけを使う。

use std::collections::BTreeMap;

use crate::domain::Entity;

pub trait EntityFactory: Send + Sync {
    fn create_by_type(&self, entity_type: &str, attributes: BTreeMap<String, String>)
        -> Option<Entity>;
}
