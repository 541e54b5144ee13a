//! ResultDelivery port - 完成した Result の配送先
//!
//! # 実装
//! - ResultDispatcher: webhook（HTTP POST）と file
//! - RecordingDelivery: テスト用（メモリに保持）
//!
//! 配送エラーは `Err(DispatchError)` として返し、runner がログに書いて捨てる。

use async_trait::async_trait;

use crate::domain::errors::DispatchError;
use crate::domain::outcome::Delivered;
use crate::domain::result::TaskResult;

/// Handler selected by the caller for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// POST to the given URI. `None` or empty is a (logged) delivery failure.
    Webhook(Option<String>),
    /// Write `<base_dir>/results/<task>-<name>.json`.
    File,
    /// Any other handler type: the result is computed and dropped.
    Discard(String),
}

impl DeliveryTarget {
    pub fn from_parts(handler_type: &str, hook_uri: Option<&str>) -> Self {
        match handler_type {
            "webhook" => DeliveryTarget::Webhook(
                hook_uri
                    .map(str::trim)
                    .filter(|uri| !uri.is_empty())
                    .map(str::to_string),
            ),
            "file" => DeliveryTarget::File,
            other => DeliveryTarget::Discard(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ResultDelivery: Send + Sync {
    async fn deliver(
        &self,
        target: &DeliveryTarget,
        result: &TaskResult,
    ) -> Result<Delivered, DispatchError>;
}
