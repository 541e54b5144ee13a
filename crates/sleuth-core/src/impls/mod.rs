//! Impls - ports の実装
//!
//! - ResultDispatcher: webhook / file 配送（本番用）
//! - RecordingDelivery: メモリに保存する配送（テスト・確認用）
//! - KnownTypesFactory: 型名一覧で判定する EntityFactory

pub mod dispatcher;
pub mod inmem_delivery;
pub mod entity_factory;

pub use self::dispatcher::ResultDispatcher;
pub use self::entity_factory::{DEFAULT_ENTITY_TYPES, KnownTypesFactory};
pub use self::inmem_delivery::RecordingDelivery;
