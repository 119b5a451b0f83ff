//! Media-type expressions shared by the consumes and produces conditions.

use std::fmt;

use crate::media_type::{InvalidMediaType, MediaType};

/// One `type/subtype` expression, possibly negated with a leading `!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MediaTypeExpression {
    pub(crate) media_type: MediaType,
    pub(crate) negated: bool,
}

impl MediaTypeExpression {
    /// Parse `type/subtype` or `!type/subtype`.
    pub(crate) fn parse(expression: &str) -> Result<Self, InvalidMediaType> {
        let (raw, negated) = match expression.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (expression, false),
        };
        Ok(Self {
            media_type: MediaType::parse(raw)?,
            negated,
        })
    }

    /// Consumes-style check: does this expression accept the given body
    /// type?
    pub(crate) fn matches_content_type(&self, content_type: &MediaType) -> bool {
        self.media_type.includes(content_type) != self.negated
    }

    /// Produces-style check: is this expression compatible with any
    /// client-acceptable type?
    pub(crate) fn matches_accepted(&self, accepted: &[MediaType]) -> bool {
        let compatible = accepted
            .iter()
            .any(|a| self.media_type.is_compatible_with(a));
        compatible != self.negated
    }
}

impl fmt::Display for MediaTypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "{}", self.media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_negation() {
        let e = MediaTypeExpression::parse("!text/plain").unwrap();
        assert!(e.negated);
        assert_eq!(e.media_type, MediaType::new("text", "plain"));
        assert_eq!(e.to_string(), "!text/plain");
    }

    #[test]
    fn test_content_type_match_with_wildcard() {
        let e = MediaTypeExpression::parse("application/*").unwrap();
        assert!(e.matches_content_type(&MediaType::new("application", "json")));
        assert!(!e.matches_content_type(&MediaType::new("text", "plain")));
    }

    #[test]
    fn test_negated_content_type_match() {
        let e = MediaTypeExpression::parse("!application/json").unwrap();
        assert!(!e.matches_content_type(&MediaType::new("application", "json")));
        assert!(e.matches_content_type(&MediaType::new("text", "plain")));
    }

    #[test]
    fn test_accepted_match_is_symmetric_compat() {
        let e = MediaTypeExpression::parse("application/json").unwrap();
        assert!(e.matches_accepted(&[MediaType::all()]));
        assert!(e.matches_accepted(&[MediaType::new("application", "*")]));
        assert!(!e.matches_accepted(&[MediaType::new("text", "html")]));
    }
}
