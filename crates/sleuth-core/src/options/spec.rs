//! OptionSpec - タスクが受け付ける option の宣言
//!
//! # 型付け
//! - `OptionType` / `ValidationRule` は閉じた enum
//! - 文字列タグ（"Integer", "alpha_numeric" など）は `FromStr` で変換し、
//!   未知のタグは `SchemaError` になる
//! - default は宣言した型と一致していなければならない

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rule::ValidationRule;
use crate::domain::errors::SchemaError;

/// Declared type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Integer,
    String,
    Boolean,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Integer => "Integer",
            OptionType::String => "String",
            OptionType::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Integer" => Ok(OptionType::Integer),
            "String" => Ok(OptionType::String),
            "Boolean" => Ok(OptionType::Boolean),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

/// A typed option value, either coerced from user input or declared as a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl OptionValue {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::Integer(_) => OptionType::Integer,
            OptionValue::String(_) => OptionType::String,
            OptionValue::Boolean(_) => OptionType::Boolean,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Integer(v) => write!(f, "{v}"),
            OptionValue::String(v) => f.write_str(v),
            OptionValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Boolean(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::String(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::String(v)
    }
}

/// One declared, typed, validated configuration parameter of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    name: String,
    option_type: OptionType,
    rule: ValidationRule,
    default: OptionValue,
}

impl OptionSpec {
    pub fn new(
        name: impl Into<String>,
        option_type: OptionType,
        rule: ValidationRule,
        default: impl Into<OptionValue>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let default = default.into();
        if default.option_type() != option_type {
            return Err(SchemaError::DefaultTypeMismatch {
                name,
                expected: option_type.to_string(),
            });
        }
        Ok(Self {
            name,
            option_type,
            rule,
            default,
        })
    }

    /// 文字列タグから宣言する（設定ファイル等から読む場合）
    pub fn from_tags(
        name: impl Into<String>,
        type_tag: &str,
        rule_tag: &str,
        default: impl Into<OptionValue>,
    ) -> Result<Self, SchemaError> {
        let option_type = type_tag.parse()?;
        let rule = rule_tag.parse()?;
        Self::new(name, option_type, rule, default)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn rule(&self) -> ValidationRule {
        self.rule
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }
}

/// Raw option as supplied by the caller, before coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub name: String,
    pub value: String,
}

impl UserOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A user option that matched a schema entry and passed its rule and cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    pub name: String,
    pub value: OptionValue,
}
