//! Name/value expressions for the params and headers conditions.
//!
//! Syntax, as supplied by mapping construction input:
//!
//! - `name` — the entry must be present
//! - `!name` — the entry must be absent
//! - `name=value` — some value of the entry must equal `value`
//! - `name!=value` — no value of the entry may equal `value`

use std::fmt;

/// One parsed expression. Ordered and hashable so condition sets have a
/// stable, deduplicated representation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameValueExpression {
    name: String,
    value: Option<String>,
    negated: bool,
}

impl NameValueExpression {
    /// Parse an expression. `lowercase_name` is set by the headers condition
    /// (header names are case-insensitive); param names stay case-sensitive.
    pub(crate) fn parse(expression: &str, lowercase_name: bool) -> Self {
        let (raw_name, value, negated) = match expression.split_once('=') {
            Some((lhs, rhs)) => {
                if let Some(name) = lhs.strip_suffix('!') {
                    (name, Some(rhs.to_string()), true)
                } else {
                    (lhs, Some(rhs.to_string()), false)
                }
            }
            None => match expression.strip_prefix('!') {
                Some(name) => (name, None, true),
                None => (expression, None, false),
            },
        };
        let name = if lowercase_name {
            raw_name.to_ascii_lowercase()
        } else {
            raw_name.to_string()
        };
        Self {
            name,
            value,
            negated,
        }
    }

    /// The entry name this expression constrains.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expected value, if this is a value expression.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether the expression is negated.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Evaluate against the values found for `name` in the request
    /// (`None` = entry absent). Negation flips the raw result.
    #[must_use]
    pub fn evaluate(&self, values: Option<&[String]>) -> bool {
        let raw = match &self.value {
            Some(expected) => {
                values.is_some_and(|vs| vs.iter().any(|v| v == expected))
            }
            None => values.is_some(),
        };
        raw != self.negated
    }
}

impl fmt::Display for NameValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.negated) {
            (Some(v), false) => write!(f, "{}={v}", self.name),
            (Some(v), true) => write!(f, "{}!={v}", self.name),
            (None, false) => f.write_str(&self.name),
            (None, true) => write!(f, "!{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_presence() {
        let e = NameValueExpression::parse("debug", false);
        assert_eq!(e.name(), "debug");
        assert_eq!(e.value(), None);
        assert!(!e.is_negated());
    }

    #[test]
    fn test_parse_absence() {
        let e = NameValueExpression::parse("!debug", false);
        assert!(e.is_negated());
        assert_eq!(e.name(), "debug");
    }

    #[test]
    fn test_parse_value() {
        let e = NameValueExpression::parse("mode=fast", false);
        assert_eq!(e.value(), Some("fast"));
        assert!(!e.is_negated());
    }

    #[test]
    fn test_parse_negated_value() {
        let e = NameValueExpression::parse("mode!=slow", false);
        assert_eq!(e.name(), "mode");
        assert_eq!(e.value(), Some("slow"));
        assert!(e.is_negated());
    }

    #[test]
    fn test_lowercase_name_for_headers() {
        let e = NameValueExpression::parse("X-Flag=on", true);
        assert_eq!(e.name(), "x-flag");
        assert_eq!(e.value(), Some("on"));
    }

    #[test]
    fn test_evaluate_presence() {
        let e = NameValueExpression::parse("debug", false);
        assert!(e.evaluate(Some(&values(&["1"]))));
        assert!(!e.evaluate(None));
    }

    #[test]
    fn test_evaluate_absence() {
        let e = NameValueExpression::parse("!debug", false);
        assert!(e.evaluate(None));
        assert!(!e.evaluate(Some(&values(&["1"]))));
    }

    #[test]
    fn test_evaluate_value_any_of_multi() {
        let e = NameValueExpression::parse("mode=fast", false);
        assert!(e.evaluate(Some(&values(&["slow", "fast"]))));
        assert!(!e.evaluate(Some(&values(&["slow"]))));
        assert!(!e.evaluate(None));
    }

    #[test]
    fn test_evaluate_negated_value() {
        let e = NameValueExpression::parse("mode!=slow", false);
        assert!(e.evaluate(None));
        assert!(e.evaluate(Some(&values(&["fast"]))));
        assert!(!e.evaluate(Some(&values(&["slow"]))));
    }

    #[test]
    fn test_display_roundtrip() {
        for expr in ["debug", "!debug", "mode=fast", "mode!=slow"] {
            assert_eq!(NameValueExpression::parse(expr, false).to_string(), expr);
        }
    }
}
