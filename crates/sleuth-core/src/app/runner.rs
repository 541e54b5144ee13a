//! TaskRunner - 1 回の呼び出しを最後まで駆動する状態機械
//!
//! # フロー
//! 1. Validating: entity の有無と型を確認（不可なら BrokenInput）
//! 2. Setup: OptionCoercer で option を検証・変換（失敗なら Run を飛ばす）
//! 3. Running: Run を spawn し、締め切り付きで待つ
//! 4. Finalizing: entity の重複除去、TaskLog を Result に埋め込む
//! 5. Dispatching: webhook / file / discard
//! 6. Cleanup: 入力が admitted の場合だけ
//!
//! `execute` はエラーを返さない。途中の失敗はすべて TaskLog と tracing に
//! 書いて吸収し、Result は必ず 1 回だけ配送される。
//!
//! # 締め切りの制限
//! 締め切りを過ぎると Run の task を abort し、`CancellationToken` を cancel する。
//! abort は次の await 地点でしか効かないので、同期処理の途中にいる Run は
//! 裏で走り続けることがある。
//!
//! - multi-thread runtime: タイマーは別の worker で発火するので、runner は
//!   Run を待たずに Finalizing へ進む
//! - current-thread runtime: await しない Run が唯一の worker を握るため、
//!   runner は Run が戻るまで進めない。戻った時点で締め切りを過ぎていれば
//!   TimedOut として扱う（ログにも timeout が残る）
//!
//! 締め切りをすぐに効かせたいホストは multi-thread runtime で動かすこと。

use std::any::Any;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::RunnerConfig;
use crate::domain::errors::DispatchError;
use crate::domain::{
    Delivered, Entity, InvocationReport, InvocationStatus, RunState, TaskLog, TaskMetadata,
    TaskResult,
};
use crate::options::{OptionCoercer, ResolvedOptions, UserOption};
use crate::ports::{Clock, DeliveryTarget, EntityFactory, ResultDelivery};
use crate::task::{Task, TaskContext};

/// TaskRunner は 1 回分の呼び出しを実行する
///
/// Run / Cleanup 以外の協力者（時計、entity 検証、配送先）はすべてここに注入される。
/// 同じ runner を複数の呼び出しで共有してよい。
///
/// # 使用例
/// ```ignore
/// let runner = TaskRunner::new(config, Arc::new(SystemClock), factory, delivery);
/// let report = runner
///     .execute(task, "7000cc9b", Some(entity), &options, "webhook", Some(uri))
///     .await;
/// ```
pub struct TaskRunner {
    config: RunnerConfig,
    clock: Arc<dyn Clock>,
    factory: Arc<dyn EntityFactory>,
    delivery: Arc<dyn ResultDelivery>,
}

impl TaskRunner {
    pub fn new(
        config: RunnerConfig,
        clock: Arc<dyn Clock>,
        factory: Arc<dyn EntityFactory>,
        delivery: Arc<dyn ResultDelivery>,
    ) -> Self {
        Self {
            config,
            clock,
            factory,
            delivery,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute one invocation end to end.
    ///
    /// Never fails: every problem ends up in the task log and in the returned
    /// [`InvocationReport`], and the result is handed to the delivery port
    /// exactly once.
    #[instrument(
        skip_all,
        fields(task_id = %task_id, task = %task.metadata().name, handler = %handler_type)
    )]
    pub async fn execute(
        &self,
        task: Arc<dyn Task>,
        task_id: &str,
        entity: Option<Entity>,
        options: &[UserOption],
        handler_type: &str,
        hook_uri: Option<&str>,
    ) -> InvocationReport {
        let metadata = Arc::new(task.metadata().clone());
        let log = TaskLog::new(task_id, metadata.name.as_str(), Arc::clone(&self.clock));
        let mut state = RunState::Init;

        advance(&mut state, RunState::Validating);
        log.log(format!("Id: {task_id}"));
        match &entity {
            Some(e) => log.log(format!("Entity: {e}")),
            None => log.log("Entity: none"),
        }
        let admitted = admit(&metadata, entity.as_ref(), &log);

        let mut result =
            TaskResult::started(metadata.name.as_str(), task_id, entity, self.clock.now());

        let mut status = InvocationStatus::BrokenInput;
        let mut ctx: Option<Arc<TaskContext>> = None;

        match admitted {
            None => advance(&mut state, RunState::BrokenInput),
            Some(input) => {
                advance(&mut state, RunState::Setup);
                log.log("Calling Setup");
                let coerced = OptionCoercer::coerce(&metadata.allowed_options, options, &log);
                let setup_ok = coerced.is_ok();
                let resolved = coerced.unwrap_or_else(|err| {
                    log.error(err.to_string());
                    log.error("Setup failed, bailing out!");
                    ResolvedOptions::default()
                });

                let context = Arc::new(TaskContext::new(
                    task_id,
                    Arc::clone(&metadata),
                    input,
                    resolved,
                    log.clone(),
                    Arc::clone(&self.factory),
                ));

                status = if setup_ok {
                    advance(&mut state, RunState::Running);
                    self.run_with_deadline(&task, &context).await
                } else {
                    InvocationStatus::SetupFailed
                };
                ctx = Some(context);
            }
        }

        advance(&mut state, RunState::Finalizing);
        if let Some(context) = &ctx {
            result.set_entities(context.entities());
        }
        log.good("Ship it!");
        result.finish(self.clock.now(), log.to_text());

        advance(&mut state, RunState::Dispatching);
        let delivery = self.dispatch(&result, handler_type, hook_uri, &log).await;

        // Cleanup は admitted な入力のときだけ（BrokenInput では呼ばない）
        let cleaned_up = match &ctx {
            Some(context) => {
                advance(&mut state, RunState::Cleanup);
                log.log("Calling cleanup()");
                if let Err(err) = task.cleanup(context).await {
                    log.error(format!("Cleanup failed: {err}"));
                }
                true
            }
            None => false,
        };
        advance(&mut state, RunState::Terminal);

        info!(?status, entities = result.entities.len(), "invocation finished");
        InvocationReport {
            status,
            delivery,
            entity_count: result.entities.len(),
            cleaned_up,
        }
    }

    async fn run_with_deadline(
        &self,
        task: &Arc<dyn Task>,
        ctx: &Arc<TaskContext>,
    ) -> InvocationStatus {
        let log = ctx.log();
        log.log("Calling Run");

        let handle = {
            let task = Arc::clone(task);
            let ctx = Arc::clone(ctx);
            tokio::spawn(async move { task.run(&ctx).await })
        };
        let abort = handle.abort_handle();

        let deadline = self.config.max_task_duration;
        let started = Instant::now();
        let joined = tokio::time::timeout(deadline, handle).await;

        // current-thread runtime では await しない Run が締め切りを越えて戻ってくる
        if joined.is_ok() && started.elapsed() > deadline {
            log.error(format!(
                "ERROR! Timed out after {deadline:?} (Run returned after {:?})",
                started.elapsed()
            ));
            ctx.cancel();
            return InvocationStatus::TimedOut;
        }

        match joined {
            Ok(Ok(Ok(()))) => InvocationStatus::Completed,
            Ok(Ok(Err(err))) => {
                log.error(format!("Run failed: {err}"));
                InvocationStatus::RunFailed
            }
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    let reason = panic_message(join_err.into_panic());
                    log.error(format!("Run panicked: {reason}"));
                } else {
                    log.error(format!("Run aborted: {join_err}"));
                }
                InvocationStatus::RunFailed
            }
            Err(_) => {
                log.error(format!("ERROR! Timed out after {deadline:?}"));
                abort.abort();
                ctx.cancel();
                InvocationStatus::TimedOut
            }
        }
    }

    async fn dispatch(
        &self,
        result: &TaskResult,
        handler_type: &str,
        hook_uri: Option<&str>,
        log: &TaskLog,
    ) -> Delivered {
        let target = DeliveryTarget::from_parts(handler_type, hook_uri);
        debug!(?target, "dispatching result");

        match self.delivery.deliver(&target, result).await {
            Ok(delivered) => {
                info!(?delivered, "result dispatched");
                delivered
            }
            Err(DispatchError::MissingHookUri) => {
                log.error("FATAL! Webhook URI not specified");
                Delivered::Failed(DispatchError::MissingHookUri.to_string())
            }
            Err(err) => {
                log.error(format!("Unable to deliver result: {err}"));
                Delivered::Failed(err.to_string())
            }
        }
    }
}

/// 入力 entity が受け付けられれば、その clone を返す
fn admit(metadata: &TaskMetadata, entity: Option<&Entity>, log: &TaskLog) -> Option<Entity> {
    let Some(entity) = entity else {
        log.error("ERROR! No entity");
        return None;
    };
    if !metadata.accepts(&entity.entity_type) {
        log.error(format!(
            "Unable to call {} on entity {entity}",
            metadata.canonical_name()
        ));
        return None;
    }
    Some(entity.clone())
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transition {state} -> {next}"
    );
    debug!(from = %state, to = %next, "state transition");
    *state = next;
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
