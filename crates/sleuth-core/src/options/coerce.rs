//! OptionCoercer - ユーザー option の検証と型変換
//!
//! # フロー（option ごと）
//! 1. schema から同名の最初の宣言を探す（無ければ黙って捨てる）
//! 2. 宣言された rule のパターンで値を検証
//! 3. 宣言された型に変換して ResolvedOption に追加
//!
//! どれか 1 つでも失敗したら coercion 全体が失敗する（fail-fast）。
//! default はここでは展開しない。`ResolvedOptions::get` が引くときに使う。

use super::spec::{OptionSpec, OptionType, OptionValue, ResolvedOption, UserOption};
use crate::domain::errors::OptionError;
use crate::domain::log::TaskLog;

pub struct OptionCoercer;

impl OptionCoercer {
    pub fn coerce(
        allowed: &[OptionSpec],
        raw: &[UserOption],
        log: &TaskLog,
    ) -> Result<ResolvedOptions, OptionError> {
        if raw.is_empty() {
            log.log("No user options");
            return Ok(ResolvedOptions::default());
        }

        let mut resolved = Vec::with_capacity(raw.len());
        for user_option in raw {
            let Some(spec) = allowed.iter().find(|s| s.name() == user_option.name) else {
                continue;
            };

            let rule = spec.rule();
            log.log(format!(
                "Option {} should match {}",
                spec.name(),
                rule.describe()
            ));

            if !rule.matches(&user_option.value) {
                return Err(OptionError::PatternMismatch {
                    name: spec.name().to_string(),
                    rule: rule.to_string(),
                    value: user_option.value.clone(),
                });
            }

            let value = Self::cast(spec, &user_option.value)?;
            resolved.push(ResolvedOption {
                name: spec.name().to_string(),
                value,
            });
        }

        let options = ResolvedOptions { resolved };
        log.log(format!("Task configured with the following options: {options}"));
        Ok(options)
    }

    fn cast(spec: &OptionSpec, value: &str) -> Result<OptionValue, OptionError> {
        match spec.option_type() {
            OptionType::Integer => value
                .parse::<i64>()
                .map(OptionValue::Integer)
                .map_err(|_| OptionError::InvalidInteger {
                    name: spec.name().to_string(),
                    value: value.to_string(),
                }),
            OptionType::String => Ok(OptionValue::String(value.to_string())),
            OptionType::Boolean => Ok(OptionValue::Boolean(value.eq_ignore_ascii_case("true"))),
        }
    }
}

/// Options accepted by Setup for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    resolved: Vec<ResolvedOption>,
}

impl ResolvedOptions {
    pub fn resolved(&self) -> &[ResolvedOption] {
        &self.resolved
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// GetOption: 後から指定された値が勝つ。無ければ schema の default。
    pub fn get(&self, name: &str, schema: &[OptionSpec]) -> Option<OptionValue> {
        self.resolved
            .iter()
            .rev()
            .find(|o| o.name == name)
            .map(|o| o.value.clone())
            .or_else(|| {
                schema
                    .iter()
                    .find(|s| s.name() == name)
                    .map(|s| s.default_value().clone())
            })
    }

    pub fn get_int(&self, name: &str, schema: &[OptionSpec]) -> Option<i64> {
        self.get(name, schema).and_then(|v| v.as_int())
    }

    pub fn get_str(&self, name: &str, schema: &[OptionSpec]) -> Option<String> {
        self.get(name, schema)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get_bool(&self, name: &str, schema: &[OptionSpec]) -> Option<bool> {
        self.get(name, schema).and_then(|v| v.as_bool())
    }
}

impl std::fmt::Display for ResolvedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .resolved
            .iter()
            .map(|o| format!("{}={}", o.name, o.value))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::options::ValidationRule;
    use crate::ports::SystemClock;

    fn log() -> TaskLog {
        TaskLog::new("id", "test", Arc::new(SystemClock))
    }

    fn schema() -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("count", OptionType::Integer, ValidationRule::Integer, 3_i64).unwrap(),
            OptionSpec::new(
                "resolvers",
                OptionType::String,
                ValidationRule::AlphaNumericList,
                "8.8.8.8",
            )
            .unwrap(),
            OptionSpec::new("verbose", OptionType::Boolean, ValidationRule::Boolean, false)
                .unwrap(),
            OptionSpec::new("prefix", OptionType::String, ValidationRule::AlphaNumeric, "host")
                .unwrap(),
        ]
    }

    #[test]
    fn integer_option_is_cast() {
        let raw = vec![UserOption::new("count", "42")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert_eq!(
            resolved.resolved(),
            &[ResolvedOption {
                name: "count".to_string(),
                value: OptionValue::Integer(42),
            }]
        );
    }

    #[test]
    fn resolver_list_passes_through_as_string() {
        let raw = vec![UserOption::new("resolvers", "8.8.8.8,1.1.1.1")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert_eq!(
            resolved.get("resolvers", &schema()),
            Some(OptionValue::from("8.8.8.8,1.1.1.1"))
        );
    }

    #[test]
    fn boolean_cast_is_case_insensitive_equality() {
        let raw = vec![UserOption::new("verbose", "true")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert_eq!(resolved.get_bool("verbose", &schema()), Some(true));

        // matches the rule (contains "true") but is not equal to it
        let raw = vec![UserOption::new("verbose", "untrue")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert_eq!(resolved.get_bool("verbose", &schema()), Some(false));
    }

    #[test]
    fn mismatch_fails_the_whole_coercion() {
        let raw = vec![
            UserOption::new("count", "5"),
            UserOption::new("prefix", "www;rm -rf"),
        ];
        let err = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap_err();
        assert_eq!(
            err,
            OptionError::PatternMismatch {
                name: "prefix".to_string(),
                rule: "alpha_numeric".to_string(),
                value: "www;rm -rf".to_string(),
            }
        );
    }

    #[test]
    fn integer_overflow_fails() {
        let raw = vec![UserOption::new("count", "99999999999999999999999")];
        let err = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap_err();
        assert!(matches!(err, OptionError::InvalidInteger { .. }));
    }

    #[test]
    fn unknown_options_are_dropped() {
        let raw = vec![UserOption::new("nope", ";;;")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn get_falls_back_to_schema_default() {
        let resolved = OptionCoercer::coerce(&schema(), &[], &log()).unwrap();
        assert_eq!(resolved.get_int("count", &schema()), Some(3));
        assert_eq!(resolved.get_str("prefix", &schema()), Some("host".to_string()));
        assert_eq!(resolved.get("missing", &schema()), None);
    }

    #[test]
    fn later_duplicate_wins() {
        let raw = vec![UserOption::new("count", "1"), UserOption::new("count", "2")];
        let resolved = OptionCoercer::coerce(&schema(), &raw, &log()).unwrap();
        assert_eq!(resolved.get_int("count", &schema()), Some(2));
    }

    #[test]
    fn typed_getter_returns_none_on_type_mismatch() {
        let resolved = ResolvedOptions::default();
        assert_eq!(resolved.get_bool("count", &schema()), None);
    }
}
