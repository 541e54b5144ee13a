//! Task - タスク型の定義と登録
//!
//! - **Task**: タスク固有ロジック（Run / Cleanup）を持つ trait
//! - **TaskContext**: 1 回分の実行コンテキスト
//! - **TaskRegistry**: 起動時にコンストラクタ表から作る明示的なレジストリ

pub mod context;
pub mod registry;

use async_trait::async_trait;

pub use self::context::TaskContext;
pub use self::registry::{TaskConstructor, TaskRegistry};
use crate::domain::TaskMetadata;
use crate::domain::errors::TaskError;

/// A task type.
///
/// One instance is shared by every invocation of the type, so any
/// per-invocation state belongs in the [`TaskContext`], not in `self`.
///
/// # 使用例
/// ```ignore
/// struct Lookup { metadata: TaskMetadata }
///
/// #[async_trait]
/// impl Task for Lookup {
///     fn metadata(&self) -> &TaskMetadata { &self.metadata }
///
///     async fn run(&self, ctx: &TaskContext) -> Result<(), TaskError> {
///         let name = ctx.entity_attribute("name");
///         ctx.create_entity("Host", attrs(&name));
///         Ok(())
///     }
/// }
/// ```
///
/// # 締め切り
/// Run は別 task として spawn され、締め切りを過ぎると abort される。
/// abort が効くのは await 地点だけなので、長い同期処理の途中では止まらない。
/// 長いループでは `ctx.is_cancelled()` を見ること。
#[async_trait]
pub trait Task: Send + Sync + 'static {
    fn metadata(&self) -> &TaskMetadata;

    async fn run(&self, ctx: &TaskContext) -> Result<(), TaskError>;

    /// Called after dispatch, only when the input entity was admitted.
    async fn cleanup(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task")
            .field(&self.metadata().canonical_name())
            .finish()
    }
}
