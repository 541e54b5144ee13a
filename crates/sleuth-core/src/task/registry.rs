//! TaskRegistry - タスク型の登録と管理
//!
//! モジュールのロード順に頼った暗黙登録はしない。起動時に
//! `TaskConstructor` の表を渡して明示的に作り、参照で引き回す。
//!
//! # 使用例
//! ```ignore
//! const BUILTIN: &[TaskConstructor] = &[
//!     TaskConstructor::new("example", example::construct),
//! ];
//! let registry = TaskRegistry::from_constructors(BUILTIN)?;
//! let task = registry.get("example");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::Task;
use crate::domain::errors::{RegistryError, SchemaError};

/// One entry of a constructor table.
#[derive(Clone, Copy)]
pub struct TaskConstructor {
    pub name: &'static str,
    pub build: fn() -> Result<Arc<dyn Task>, SchemaError>,
}

impl TaskConstructor {
    pub const fn new(
        name: &'static str,
        build: fn() -> Result<Arc<dyn Task>, SchemaError>,
    ) -> Self {
        Self { name, build }
    }
}

#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    pub fn from_constructors(table: &[TaskConstructor]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_table(table)?;
        Ok(registry)
    }

    /// Build and register every entry of a constructor table, in order.
    pub fn register_table(&mut self, table: &[TaskConstructor]) -> Result<(), RegistryError> {
        for ctor in table {
            let task = (ctor.build)().map_err(|source| RegistryError::InvalidSchema {
                task: ctor.name.to_string(),
                source,
            })?;
            self.register(task)?;
        }
        Ok(())
    }

    /// Register a task type under its metadata name.
    pub fn register(&mut self, task: Arc<dyn Task>) -> Result<(), RegistryError> {
        let metadata = task.metadata();
        let name = metadata.name.clone();
        metadata
            .validate()
            .map_err(|source| RegistryError::InvalidSchema {
                task: name.clone(),
                source,
            })?;
        if self.tasks.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(task = %metadata.canonical_name(), "registered task type");
        self.tasks.insert(name, task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered tasks, sorted by name.
    pub fn tasks(&self) -> Vec<Arc<dyn Task>> {
        self.registered_types()
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskMetadata;
    use crate::options::{OptionSpec, OptionType, ValidationRule};
    use crate::test_support::StaticTask;

    fn example() -> Result<Arc<dyn Task>, SchemaError> {
        Ok(Arc::new(StaticTask::new(
            TaskMetadata::builder("example").allow_any_type().build()?,
        )))
    }

    fn lookup() -> Result<Arc<dyn Task>, SchemaError> {
        Ok(Arc::new(StaticTask::new(
            TaskMetadata::builder("lookup").allow_type("DnsRecord").build()?,
        )))
    }

    fn broken() -> Result<Arc<dyn Task>, SchemaError> {
        let spec = OptionSpec::from_tags("count", "Integer", "hex", 1_i64)?;
        Ok(Arc::new(StaticTask::new(
            TaskMetadata::builder("broken").option(spec).build()?,
        )))
    }

    #[test]
    fn builds_from_constructor_table() {
        let registry = TaskRegistry::from_constructors(&[
            TaskConstructor::new("lookup", lookup),
            TaskConstructor::new("example", example),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.registered_types(), vec!["example", "lookup"]);
        assert!(registry.get("lookup").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn double_registration_is_rejected() {
        let err = TaskRegistry::from_constructors(&[
            TaskConstructor::new("example", example),
            TaskConstructor::new("example", example),
        ])
        .err()
        .unwrap();
        assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "example"));
    }

    #[test]
    fn invalid_schema_is_rejected_at_startup() {
        let err = TaskRegistry::from_constructors(&[TaskConstructor::new("broken", broken)])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RegistryError::InvalidSchema { task, source: SchemaError::UnknownRule(rule) }
                if task == "broken" && rule == "hex"
        ));
    }

    #[test]
    fn duplicate_option_names_are_rejected_on_register() {
        let count =
            OptionSpec::new("count", OptionType::Integer, ValidationRule::Integer, 1_i64).unwrap();
        // builder を通さずに組み立てたメタデータも register で検証される
        let metadata = TaskMetadata {
            allowed_options: vec![count.clone(), count],
            ..TaskMetadata::builder("dup").build().unwrap()
        };
        let mut registry = TaskRegistry::new();
        let err = registry
            .register(Arc::new(StaticTask::new(metadata)))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidSchema { source: SchemaError::DuplicateOption(_), .. }
        ));
    }
}
