//! dns_forward_lookup - 名前を解決して IpAddress / Ipv6Address を作る
//!
//! 解決はシステムのリゾルバで行う。`resolvers` option はログに残すだけ。

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use sleuth_core::domain::errors::{SchemaError, TaskError};
use sleuth_core::{OptionSpec, Task, TaskContext, TaskMetadata};

use super::named;

pub struct DnsForwardLookup {
    metadata: TaskMetadata,
}

pub fn construct() -> Result<Arc<dyn Task>, SchemaError> {
    let metadata = TaskMetadata::builder("dns_forward_lookup")
        .description("Forward DNS lookup")
        .allow_type("DnsRecord")
        .allow_type("Host")
        .option(OptionSpec::from_tags(
            "resolvers",
            "String",
            "alpha_numeric_list",
            "8.8.8.8",
        )?)
        .build()?;
    Ok(Arc::new(DnsForwardLookup { metadata }))
}

#[async_trait]
impl Task for DnsForwardLookup {
    fn metadata(&self) -> &TaskMetadata {
        &self.metadata
    }

    async fn run(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        let name = ctx.entity_attribute("name");
        if name.is_empty() {
            return Err(TaskError::failed("entity has no name to resolve"));
        }
        let resolvers = ctx.option_str("resolvers").unwrap_or_default();
        ctx.log().log(format!("Resolving {name} (resolvers: {resolvers})"));

        let addrs = tokio::select! {
            addrs = tokio::net::lookup_host((name.as_str(), 0)) => addrs?,
            _ = ctx.cancelled() => return Err(TaskError::Cancelled),
        };

        for addr in addrs {
            let entity_type = match addr.ip() {
                IpAddr::V4(_) => "IpAddress",
                IpAddr::V6(_) => "Ipv6Address",
            };
            ctx.create_entity(entity_type, named(addr.ip().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sleuth_core::Entity;
    use sleuth_core::domain::TaskLog;
    use sleuth_core::impls::KnownTypesFactory;
    use sleuth_core::options::ResolvedOptions;
    use sleuth_core::ports::SystemClock;

    use super::*;

    fn context(task: &Arc<dyn Task>, entity: Entity) -> TaskContext {
        TaskContext::new(
            "id-1",
            Arc::new(task.metadata().clone()),
            entity,
            ResolvedOptions::default(),
            TaskLog::new("id-1", "dns_forward_lookup", Arc::new(SystemClock)),
            Arc::new(KnownTypesFactory::default()),
        )
    }

    #[test]
    fn accepts_dns_records_and_hosts() {
        let task = construct().unwrap();
        assert!(task.metadata().accepts("DnsRecord"));
        assert!(task.metadata().accepts("Host"));
        assert!(!task.metadata().accepts("Person"));
    }

    #[tokio::test]
    async fn literal_address_resolves_to_itself() {
        let task = construct().unwrap();
        let ctx = context(&task, Entity::named("Host", "127.0.0.1"));
        task.run(&ctx).await.unwrap();

        assert_eq!(ctx.entities(), vec![Entity::named("IpAddress", "127.0.0.1")]);
        let text = ctx.log().to_text();
        assert!(text.contains("resolvers: 8.8.8.8"));
    }

    #[tokio::test]
    async fn nameless_entity_fails() {
        let task = construct().unwrap();
        let ctx = context(&task, Entity::new("DnsRecord", Default::default()));
        let err = task.run(&ctx).await.unwrap_err();
        assert!(matches!(err, TaskError::Failed(_)));
    }
}
