//! Built-in tasks - CLI に同梱するタスク型
//!
//! 新しいタスクは `construct` 関数を持つモジュールを足し、`BUILTIN_TASKS` に並べる。

pub mod dns_forward_lookup;
pub mod example;

use std::collections::BTreeMap;

use sleuth_core::TaskConstructor;

pub const BUILTIN_TASKS: &[TaskConstructor] = &[
    TaskConstructor::new("example", example::construct),
    TaskConstructor::new("dns_forward_lookup", dns_forward_lookup::construct),
];

/// `{"name": name}`
pub(crate) fn named(name: impl Into<String>) -> BTreeMap<String, String> {
    BTreeMap::from([("name".to_string(), name.into())])
}
