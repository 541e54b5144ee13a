//! TaskResult - 1 回の呼び出しの最終結果
//!
//! フィールド名は受け手との互換のため固定:
//! `task_name, entity, entities, id, timestamp_start, timestamp_end, task_log`

use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub entity: Option<Entity>,
    pub entities: Vec<Entity>,
    pub id: String,
    #[serde(with = "utc_seconds")]
    pub timestamp_start: DateTime<Utc>,
    #[serde(with = "utc_seconds")]
    pub timestamp_end: DateTime<Utc>,
    pub task_log: String,
}

impl TaskResult {
    pub fn started(
        task_name: impl Into<String>,
        id: impl Into<String>,
        entity: Option<Entity>,
        at: DateTime<Utc>,
    ) -> Self {
        let start = truncate_to_second(at);
        Self {
            task_name: task_name.into(),
            entity,
            entities: Vec::new(),
            id: id.into(),
            timestamp_start: start,
            timestamp_end: start,
            task_log: String::new(),
        }
    }

    /// 終了時刻を記録する。壁時計が戻っても start より前にはしない。
    pub fn finish(&mut self, at: DateTime<Utc>, task_log: String) {
        self.timestamp_end = truncate_to_second(at).max(self.timestamp_start);
        self.task_log = task_log;
    }

    /// Serialized-form de-duplication, first occurrence wins.
    pub fn set_entities(&mut self, entities: Vec<Entity>) {
        self.entities = dedup_entities(entities);
    }

    /// `name` attribute of the input entity, or empty.
    pub fn entity_name(&self) -> &str {
        self.entity
            .as_ref()
            .and_then(Entity::name)
            .unwrap_or_default()
    }
}

pub fn dedup_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.to_json()))
        .collect()
}

fn truncate_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}

/// `2014-12-15 12:00:35 UTC`
mod utc_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&at.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
