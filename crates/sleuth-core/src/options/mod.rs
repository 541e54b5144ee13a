//! Options - 宣言的な option schema と coercion
//!
//! - **spec**: OptionSpec / OptionType / OptionValue / UserOption
//! - **rule**: ValidationRule とコンパイル済みパターン
//! - **coerce**: OptionCoercer と ResolvedOptions（GetOption）

pub mod spec;
pub mod rule;
pub mod coerce;

pub use self::coerce::{OptionCoercer, ResolvedOptions};
pub use self::rule::ValidationRule;
pub use self::spec::{OptionSpec, OptionType, OptionValue, ResolvedOption, UserOption};
