//! sleuth-core
//!
//! Execution contract for one task invocation: admit the input entity,
//! coerce user options against the task's declared schema, run the task
//! under a deadline, collect derived entities and deliver the result.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（entity, metadata, log, result, state, outcome, errors）
//! - **options**: option schema、検証ルール、coercion
//! - **ports**: 抽象化レイヤー（Clock, EntityFactory, ResultDelivery）
//! - **impls**: 実装（ResultDispatcher, RecordingDelivery, KnownTypesFactory）
//! - **task**: Task trait、TaskContext、TaskRegistry
//! - **app**: TaskRunner と AppBuilder
//! - **config**: RunnerConfig

pub mod domain;
pub mod options;
pub mod ports;
pub mod impls;
pub mod task;
pub mod app;
pub mod config;

#[cfg(test)]
mod test_support;

pub use crate::app::{App, AppBuilder, InvocationRequest, TaskRunner};
pub use crate::config::RunnerConfig;
pub use crate::domain::{Entity, InvocationReport, InvocationStatus, TaskMetadata, TaskResult};
pub use crate::options::{OptionSpec, OptionType, UserOption, ValidationRule};
pub use crate::task::{Task, TaskConstructor, TaskContext, TaskRegistry};
