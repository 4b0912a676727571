//! Condition evaluation.
//!
//! [`Condition::matches`] never fails: malformed patterns, missing range bounds and
//! failed numeric coercions all read as "condition not met".

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::product::{coerce_number, FieldValue};

/// Comparison applied between a product field and the configured value(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    NotBetween,
    Regex,
    /// Any operator name this build does not know. Never matches.
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Short symbol used in alert messages.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Contains => "contains",
            Self::NotContains => "does not contain",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::Regex => "matches",
            Self::Unknown => "?",
        }
    }

    /// Range operators need a second bound.
    #[must_use]
    pub const fn requires_second_value(&self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator and its operands, with any regex pattern compiled up front.
///
/// Build one per configuration per pass and reuse it for every product.
#[derive(Debug, Clone)]
pub struct Condition<'a> {
    operator: Operator,
    value: &'a str,
    second_value: Option<&'a str>,
    pattern: Option<Regex>,
}

impl<'a> Condition<'a> {
    /// An invalid regex is logged here, once, and the condition never matches.
    #[must_use]
    pub fn new(operator: Operator, value: &'a str, second_value: Option<&'a str>) -> Self {
        let pattern = if operator == Operator::Regex {
            match RegexBuilder::new(value).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %value, error = %e, "Invalid regex in alert condition");
                    None
                }
            }
        } else {
            None
        };
        Self {
            operator,
            value,
            second_value,
            pattern,
        }
    }

    #[must_use]
    pub fn matches(&self, field: &FieldValue) -> bool {
        let value = self.value;
        match self.operator {
            Operator::Equal => field.as_text() == value,
            Operator::NotEqual => field.as_text() != value,
            Operator::Contains => contains_ignore_case(&field.as_text(), value),
            Operator::NotContains => !contains_ignore_case(&field.as_text(), value),
            Operator::Greater => field.as_number() > coerce_number(value),
            Operator::Less => field.as_number() < coerce_number(value),
            Operator::GreaterOrEqual => field.as_number() >= coerce_number(value),
            Operator::LessOrEqual => field.as_number() <= coerce_number(value),
            Operator::Between | Operator::NotBetween => {
                let Some(second) = self.second_value else {
                    return false;
                };
                let v = field.as_number();
                let lo = coerce_number(value);
                let hi = coerce_number(second);
                if v.is_nan() || lo.is_nan() || hi.is_nan() {
                    return false;
                }
                let inside = v >= lo && v <= hi;
                if self.operator == Operator::Between {
                    inside
                } else {
                    !inside
                }
            }
            Operator::Regex => self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(&field.as_text())),
            Operator::Unknown => false,
        }
    }
}

/// Decide whether `field` satisfies `operator` against `value` (and
/// `second_value` for range operators).
///
/// Compiles the condition on every call; use [`Condition`] when checking
/// many fields.
#[must_use]
pub fn evaluate(
    field: &FieldValue,
    operator: Operator,
    value: &str,
    second_value: Option<&str>,
) -> bool {
    Condition::new(operator, value, second_value).matches(field)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
