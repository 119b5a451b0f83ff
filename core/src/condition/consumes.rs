//! Request content-type condition.

use std::cmp::Ordering;
use std::fmt;

use crate::condition::media_expr::MediaTypeExpression;
use crate::condition::RequestCondition;
use crate::media_type::{InvalidMediaType, MediaType};
use crate::request::RouteRequest;

/// Constrains the media type a request body may carry.
///
/// The condition matches if the declared `Content-Type` is included by at
/// least one expression, or if the expression list is empty. A request
/// without a `Content-Type` header is treated as `application/octet-stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConsumesCondition {
    expressions: Vec<MediaTypeExpression>,
}

impl ConsumesCondition {
    /// Parse expression strings (`type/subtype` or `!type/subtype`).
    ///
    /// Expressions are deduplicated and kept sorted most-specific first.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMediaType`] if any expression is not a parseable
    /// media type.
    pub fn new<I, S>(consumes: I) -> Result<Self, InvalidMediaType>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expressions = Vec::new();
        for raw in consumes {
            let expr = MediaTypeExpression::parse(raw.as_ref())?;
            if !expressions.contains(&expr) {
                expressions.push(expr);
            }
        }
        expressions.sort_by(|a, b| MediaType::specificity_cmp(&a.media_type, &b.media_type));
        Ok(Self { expressions })
    }

    /// The media types a matching request body may have, for diagnostics.
    /// Negated expressions are excluded.
    #[must_use]
    pub fn consumable_media_types(&self) -> Vec<MediaType> {
        self.expressions
            .iter()
            .filter(|e| !e.negated)
            .map(|e| e.media_type.clone())
            .collect()
    }

    /// Whether this condition would accept the given body type, independent
    /// of a full request.
    #[must_use]
    pub fn accepts(&self, content_type: &MediaType) -> bool {
        self.expressions.is_empty()
            || self
                .expressions
                .iter()
                .any(|e| e.matches_content_type(content_type))
    }
}

impl RequestCondition for ConsumesCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        if self.expressions.is_empty() {
            return Some(self.clone());
        }
        // Malformed content types are rejected by the dispatcher before
        // conditions run; a failed parse here simply never matches.
        let content_type = match request.content_type() {
            Ok(Some(ct)) => ct,
            Ok(None) => MediaType::application_octet_stream(),
            Err(_) => return None,
        };
        let matched: Vec<MediaTypeExpression> = self
            .expressions
            .iter()
            .filter(|e| e.matches_content_type(&content_type))
            .cloned()
            .collect();
        if matched.is_empty() {
            return None;
        }
        Some(Self {
            expressions: matched,
        })
    }

    fn combine(&self, other: &Self) -> Self {
        // The narrower declaration wins outright; expressions from the two
        // levels are not merged.
        if other.expressions.is_empty() {
            self.clone()
        } else {
            other.clone()
        }
    }

    fn compare(&self, other: &Self, _request: &RouteRequest) -> Ordering {
        match (self.expressions.first(), other.expressions.first()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => MediaType::specificity_cmp(&a.media_type, &b.media_type),
        }
    }

    fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl fmt::Display for ConsumesCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(" || "))
    }
}
