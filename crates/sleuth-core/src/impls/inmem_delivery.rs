//! RecordingDelivery - 配送せずにメモリへ保存する ResultDelivery
//!
//! runner のテストや、Result をその場で確認したいツール用。
//! 指定すれば配送失敗を模擬できる。

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::errors::DispatchError;
use crate::domain::outcome::Delivered;
use crate::domain::result::TaskResult;
use crate::ports::{DeliveryTarget, ResultDelivery};

#[derive(Clone, Default)]
pub struct RecordingDelivery {
    delivered: Arc<Mutex<Vec<(DeliveryTarget, TaskResult)>>>,
    fail_with_missing_uri: bool,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に `DispatchError::MissingHookUri` を返すモード
    pub fn failing() -> Self {
        Self {
            fail_with_missing_uri: true,
            ..Self::default()
        }
    }

    pub fn results(&self) -> Vec<TaskResult> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn targets(&self) -> Vec<DeliveryTarget> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// The only recorded result, if exactly one was delivered.
    pub fn single(&self) -> Option<TaskResult> {
        let results = self.results();
        match results.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl ResultDelivery for RecordingDelivery {
    async fn deliver(
        &self,
        target: &DeliveryTarget,
        result: &TaskResult,
    ) -> Result<Delivered, DispatchError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((target.clone(), result.clone()));

        if self.fail_with_missing_uri {
            return Err(DispatchError::MissingHookUri);
        }
        Ok(match target {
            DeliveryTarget::Webhook(_) => Delivered::Posted(200),
            DeliveryTarget::File => Delivered::Written("memory".into()),
            DeliveryTarget::Discard(handler) => Delivered::Discarded(handler.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn records_every_delivery() {
        let delivery = RecordingDelivery::new();
        let result = TaskResult::started("t", "1", None, Utc::now());

        delivery.deliver(&DeliveryTarget::File, &result).await.unwrap();
        assert_eq!(delivery.single(), Some(result.clone()));

        delivery
            .deliver(&DeliveryTarget::Webhook(None), &result)
            .await
            .unwrap();
        assert_eq!(delivery.results().len(), 2);
        assert_eq!(delivery.single(), None);
        assert_eq!(delivery.targets()[1], DeliveryTarget::Webhook(None));
    }

    #[tokio::test]
    async fn failing_mode_still_records() {
        let delivery = RecordingDelivery::failing();
        let result = TaskResult::started("t", "1", None, Utc::now());
        let err = delivery.deliver(&DeliveryTarget::File, &result).await.unwrap_err();
        assert!(matches!(err, DispatchError::MissingHookUri));
        assert_eq!(delivery.results().len(), 1);
    }
}
