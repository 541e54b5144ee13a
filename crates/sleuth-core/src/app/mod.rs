//! App - アプリケーション層
//!
//! - **runner**: 1 回の呼び出しを駆動する TaskRunner
//! - **builder**: AppBuilder / App / InvocationRequest

pub mod builder;
pub mod runner;

pub use self::builder::{App, AppBuilder, InvocationRequest};
pub use self::runner::TaskRunner;
