//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンで registry / config / 協力者をまとめる
//! - 起動時検証（Fail-fast 設計）
//! - 呼び出し単位の入力は `InvocationRequest` にまとめる

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::runner::TaskRunner;
use crate::config::RunnerConfig;
use crate::domain::errors::{BuildError, RegistryError};
use crate::domain::{Entity, InvocationReport};
use crate::impls::{KnownTypesFactory, ResultDispatcher};
use crate::options::UserOption;
use crate::ports::{Clock, EntityFactory, ResultDelivery, SystemClock};
use crate::task::{Task, TaskConstructor, TaskRegistry};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .register_all(BUILTIN_TASKS)?
///     .with_config(RunnerConfig::from_env()?)
///     .expect_tasks(&["dns_forward_lookup"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_tasks() で期待される task 名を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
///
/// delivery を指定しなければ `config.base_dir` を使う `ResultDispatcher` になる。
pub struct AppBuilder {
    registry: TaskRegistry,
    expected_tasks: Option<Vec<String>>,
    config: RunnerConfig,
    clock: Arc<dyn Clock>,
    factory: Arc<dyn EntityFactory>,
    delivery: Option<Arc<dyn ResultDelivery>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            registry: TaskRegistry::new(),
            expected_tasks: None,
            config: RunnerConfig::default(),
            clock: Arc::new(SystemClock),
            factory: Arc::new(KnownTypesFactory::default()),
            delivery: None,
        }
    }

    /// コンストラクタ表のタスクをまとめて登録
    pub fn register_all(mut self, table: &[TaskConstructor]) -> Result<Self, RegistryError> {
        self.registry.register_table(table)?;
        Ok(self)
    }

    pub fn register(mut self, task: Arc<dyn Task>) -> Result<Self, RegistryError> {
        self.registry.register(task)?;
        Ok(self)
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn EntityFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn ResultDelivery>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// 期待される task 名のリストを設定
    pub fn expect_tasks(mut self, task_names: &[&str]) -> Self {
        self.expected_tasks = Some(task_names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - expect_tasks() で設定された task が全て登録されているかチェック
    /// - 不足があれば BuildError::MissingTaskTypes を返す
    pub fn build(self) -> Result<App, BuildError> {
        if let Some(expected_tasks) = &self.expected_tasks {
            let registered_types = self.registry.registered_types();
            let missing_tasks: Vec<String> = expected_tasks
                .iter()
                .filter(|x| !registered_types.contains(x))
                .cloned()
                .collect();
            if !missing_tasks.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing_tasks));
            }
        }

        let delivery = self
            .delivery
            .unwrap_or_else(|| Arc::new(ResultDispatcher::new(self.config.base_dir.clone())));
        let runner = TaskRunner::new(self.config, self.clock, self.factory, delivery);

        Ok(App {
            registry: self.registry,
            runner,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_handler() -> String {
    "webhook".to_string()
}

/// 壊れた entity は None にして、runner 側で BrokenInput として扱わせる
fn lenient_entity<'de, D>(deserializer: D) -> Result<Option<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value::<Entity>(raw) {
        Ok(entity) => Ok(Some(entity)),
        Err(err) => {
            warn!(%err, "malformed entity in request");
            Ok(None)
        }
    }
}

/// One invocation as received from a caller (CLI flags or a JSON file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvocationRequest {
    pub task_id: String,
    pub task_name: String,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub entity: Option<Entity>,
    #[serde(default)]
    pub options: Vec<UserOption>,
    #[serde(default = "default_handler")]
    pub handler_type: String,
    #[serde(default)]
    pub hook_uri: Option<String>,
}

/// App はアプリケーションのランタイム
///
/// - TaskRegistry: 名前からタスク型を引く
/// - TaskRunner: 1 回の呼び出しを実行する
pub struct App {
    pub registry: TaskRegistry,
    runner: TaskRunner,
}

impl App {
    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// 未登録の task 名だけはエラーとして返す（呼び出しは始まらない）。
    /// それ以降の失敗はすべて `InvocationReport` と配送された Result に現れる。
    pub async fn execute(&self, request: InvocationRequest) -> Result<InvocationReport, BuildError> {
        let task = self
            .registry
            .get(&request.task_name)
            .ok_or_else(|| BuildError::UnknownTask(request.task_name.clone()))?;

        Ok(self
            .runner
            .execute(
                task,
                &request.task_id,
                request.entity,
                &request.options,
                &request.handler_type,
                request.hook_uri.as_deref(),
            )
            .await)
    }
}
