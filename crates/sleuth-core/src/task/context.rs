//! TaskContext - Run / Cleanup に渡される 1 回分の実行コンテキスト
//!
//! runner と spawn された Run が同じ context を共有する（`Arc`）。
//! 締め切りを過ぎた後も Run 側が書き込み続けることはあるが、
//! runner はその時点までの entity だけを Result に入れる。

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::domain::errors::TaskError;
use crate::domain::{Entity, TaskLog, TaskMetadata, encode_lossy};
use crate::options::{OptionValue, ResolvedOptions};
use crate::ports::EntityFactory;

/// Characters refused by [`TaskContext::shell`].
const ILLEGAL_SHELL_CHARS: &[char] = &['|', ';', '`'];

pub struct TaskContext {
    task_id: String,
    metadata: Arc<TaskMetadata>,
    entity: Entity,
    options: ResolvedOptions,
    log: TaskLog,
    factory: Arc<dyn EntityFactory>,
    entities: Mutex<Vec<Entity>>,
    cancel: CancellationToken,
}

impl TaskContext {
    pub fn new(
        task_id: impl Into<String>,
        metadata: Arc<TaskMetadata>,
        entity: Entity,
        options: ResolvedOptions,
        log: TaskLog,
        factory: Arc<dyn EntityFactory>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            metadata,
            entity,
            options,
            log,
            factory,
            entities: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn metadata(&self) -> &TaskMetadata {
        &self.metadata
    }

    pub fn log(&self) -> &TaskLog {
        &self.log
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// `"name: version"`
    pub fn canonical_name(&self) -> String {
        self.metadata.canonical_name()
    }

    /// Attribute of the input entity, or an empty string when missing.
    pub fn entity_attribute(&self, name: &str) -> String {
        self.entity.attribute(name).unwrap_or_default().to_string()
    }

    /// GetOption: resolved user value, else the declared default.
    pub fn option(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name, &self.metadata.allowed_options)
    }

    pub fn option_int(&self, name: &str) -> Option<i64> {
        self.options.get_int(name, &self.metadata.allowed_options)
    }

    pub fn option_str(&self, name: &str) -> Option<String> {
        self.options.get_str(name, &self.metadata.allowed_options)
    }

    pub fn option_bool(&self, name: &str) -> Option<bool> {
        self.options.get_bool(name, &self.metadata.allowed_options)
    }

    /// Validate a derived entity through the factory and add it to the result.
    pub fn create_entity(
        &self,
        entity_type: &str,
        attributes: BTreeMap<String, String>,
    ) -> Option<Entity> {
        self.log
            .good(format!("Creating entity: {entity_type}, {attributes:?}"));

        let Some(entity) = self.factory.create_by_type(entity_type, attributes.clone()) else {
            self.log.error(format!(
                "SKIPPING Unable to verify entity: {entity_type} {attributes:?}"
            ));
            return None;
        };

        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entity.clone());
        Some(entity)
    }

    /// Entities created so far, in creation order (duplicates included).
    pub fn entities(&self) -> Vec<Entity> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the runner gives up on this invocation.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run a shell command and return its stdout.
    ///
    /// Commands containing `|`, `;` or a backtick are refused without being
    /// run. Only pass values that went through option validation.
    pub async fn shell(&self, command: &str) -> Result<String, TaskError> {
        if command.contains(ILLEGAL_SHELL_CHARS) {
            self.log
                .error(format!("FATAL Illegal character in {command}"));
            return Err(TaskError::IllegalCommand(command.to_string()));
        }
        if self.is_cancelled() {
            return Err(TaskError::Cancelled);
        }

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TaskError::CommandFailed {
                status: output.status.to_string(),
                stderr: encode_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(encode_lossy(&output.stdout))
    }
}
