//! ResultDispatcher - webhook / file への Result 配送
//!
//! # 既知の制約
//! - webhook の POST に timeout は設定しない。必要なら呼び出し側で包む
//! - file 配送はロックしない。同じ派生名に同時に書くと後勝ちで競合する

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument};

use crate::domain::errors::DispatchError;
use crate::domain::outcome::Delivered;
use crate::domain::result::TaskResult;
use crate::ports::{DeliveryTarget, ResultDelivery};

pub struct ResultDispatcher {
    client: Client,
    base_dir: PathBuf,
}

impl ResultDispatcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_client(Client::new(), base_dir)
    }

    pub fn with_client(client: Client, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            base_dir: base_dir.into(),
        }
    }

    #[instrument(skip(self, result), fields(task = %result.task_name, id = %result.id))]
    pub async fn deliver_webhook(
        &self,
        result: &TaskResult,
        hook_uri: Option<&str>,
    ) -> Result<Delivered, DispatchError> {
        let Some(uri) = hook_uri.filter(|u| !u.trim().is_empty()) else {
            return Err(DispatchError::MissingHookUri);
        };

        info!(%uri, "sending result to webhook");
        // 文字列は取り込み時に encode_lossy 済みなので、そのまま直列化する
        let body = serde_json::to_vec(result)?;

        let response = self
            .client
            .post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| DispatchError::Transport {
                uri: uri.to_string(),
                source,
            })?;

        Ok(Delivered::Posted(response.status().as_u16()))
    }

    #[instrument(skip(self, result), fields(task = %result.task_name, id = %result.id))]
    pub async fn deliver_file(&self, result: &TaskResult) -> Result<Delivered, DispatchError> {
        let path = self.result_path(result);
        info!(path = %path.display(), "writing result to file");

        let body = serde_json::to_vec_pretty(result)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| DispatchError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| DispatchError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(Delivered::Written(path))
    }

    /// `<base_dir>/results/<task_name>-<entity name without '/'>.json`
    pub fn result_path(&self, result: &TaskResult) -> PathBuf {
        let name = result.entity_name().replace('/', "");
        self.base_dir
            .join("results")
            .join(format!("{}-{}.json", result.task_name, name))
    }
}

#[async_trait]
impl ResultDelivery for ResultDispatcher {
    async fn deliver(
        &self,
        target: &DeliveryTarget,
        result: &TaskResult,
    ) -> Result<Delivered, DispatchError> {
        match target {
            DeliveryTarget::Webhook(uri) => self.deliver_webhook(result, uri.as_deref()).await,
            DeliveryTarget::File => self.deliver_file(result).await,
            DeliveryTarget::Discard(handler) => Ok(Delivered::Discarded(handler.clone())),
        }
    }
}
