//! Ports - 抽象化レイヤー
//!
//! core の外にある協力者（時計、entity 検証、Result の配送先）への
//! インターフェース。実装は `impls` にある。

pub mod clock;
pub mod entity_factory;
pub mod delivery;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::delivery::{DeliveryTarget, ResultDelivery};
pub use self::entity_factory::EntityFactory;
