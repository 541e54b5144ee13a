//! example - 任意の entity から DnsRecord を `count` 個作るデモ用タスク

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sleuth_core::domain::errors::{SchemaError, TaskError};
use sleuth_core::{OptionSpec, Task, TaskContext, TaskMetadata};

use super::named;

const SLEEP_FOR: Duration = Duration::from_secs(5);

pub struct Example {
    metadata: TaskMetadata,
}

pub fn construct() -> Result<Arc<dyn Task>, SchemaError> {
    let metadata = TaskMetadata::builder("example")
        .description("Creates `count` DnsRecord entities under the input entity's name")
        .allow_any_type()
        .option(OptionSpec::from_tags("count", "Integer", "integer", 3_i64)?)
        .option(OptionSpec::from_tags("prefix", "String", "alpha_numeric", "host")?)
        .option(OptionSpec::from_tags("sleep", "Boolean", "boolean", false)?)
        .build()?;
    Ok(Arc::new(Example { metadata }))
}

#[async_trait]
impl Task for Example {
    fn metadata(&self) -> &TaskMetadata {
        &self.metadata
    }

    async fn run(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        let name = ctx.entity_attribute("name");
        let count = ctx.option_int("count").unwrap_or_default();
        let prefix = ctx.option_str("prefix").unwrap_or_default();

        if ctx.option_bool("sleep").unwrap_or(false) {
            ctx.log().log(format!("Sleeping for {SLEEP_FOR:?}"));
            tokio::select! {
                _ = tokio::time::sleep(SLEEP_FOR) => {}
                _ = ctx.cancelled() => return Err(TaskError::Cancelled),
            }
        }

        for i in 0..count {
            if ctx.is_cancelled() {
                return Err(TaskError::Cancelled);
            }
            ctx.create_entity("DnsRecord", named(format!("{prefix}{i}.{name}")));
        }
        ctx.log().good(format!("Created {count} entities"));
        Ok(())
    }
}
