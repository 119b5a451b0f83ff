//! Response content-negotiation condition.

use std::cmp::Ordering;
use std::fmt;

use crate::condition::media_expr::MediaTypeExpression;
use crate::condition::RequestCondition;
use crate::media_type::{InvalidMediaType, MediaType};
use crate::request::RouteRequest;

/// Constrains the media types a handler can produce, matched against the
/// request's `Accept` header.
///
/// The condition matches if at least one expression is compatible with at
/// least one acceptable type, or if the expression list is empty. A request
/// without an `Accept` header accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProducesCondition {
    expressions: Vec<MediaTypeExpression>,
}

impl ProducesCondition {
    /// Parse expression strings (`type/subtype` or `!type/subtype`).
    ///
    /// Expressions are deduplicated and kept sorted by specificity and
    /// quality.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMediaType`] if any expression is not a parseable
    /// media type.
    pub fn new<I, S>(produces: I) -> Result<Self, InvalidMediaType>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expressions = Vec::new();
        for raw in produces {
            let expr = MediaTypeExpression::parse(raw.as_ref())?;
            if !expressions.contains(&expr) {
                expressions.push(expr);
            }
        }
        expressions
            .sort_by(|a, b| MediaType::quality_and_specificity_cmp(&a.media_type, &b.media_type));
        Ok(Self { expressions })
    }

    /// The media types a matching handler can produce, for diagnostics.
    /// Negated expressions are excluded.
    #[must_use]
    pub fn producible_media_types(&self) -> Vec<MediaType> {
        self.expressions
            .iter()
            .filter(|e| !e.negated)
            .map(|e| e.media_type.clone())
            .collect()
    }

    fn accepted_types(request: &RouteRequest) -> Option<Vec<MediaType>> {
        let mut accepted = request.accepted_types().ok()?;
        MediaType::sort_by_specificity_and_quality(&mut accepted);
        Some(accepted)
    }

    /// The media types this condition stands for when ranking candidates;
    /// an empty condition stands for `*/*`.
    fn types_to_compare(&self) -> Vec<MediaType> {
        if self.expressions.is_empty() {
            vec![MediaType::all()]
        } else {
            self.expressions
                .iter()
                .map(|e| e.media_type.clone())
                .collect()
        }
    }

    fn index_of_equal(types: &[MediaType], accepted: &MediaType) -> Option<usize> {
        types
            .iter()
            .position(|t| t.equals_type_and_subtype(accepted))
    }

    fn index_of_included(types: &[MediaType], accepted: &MediaType) -> Option<usize> {
        types.iter().position(|t| accepted.includes(t))
    }

    fn compare_found(
        mine: &[MediaType],
        my_index: Option<usize>,
        theirs: &[MediaType],
        their_index: Option<usize>,
    ) -> Ordering {
        match (my_index, their_index) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(i), Some(j)) => {
                let a = &mine[i];
                let b = &theirs[j];
                b.quality()
                    .partial_cmp(&a.quality())
                    .unwrap_or(Ordering::Equal)
                    .then(i.cmp(&j))
            }
        }
    }
}

impl RequestCondition for ProducesCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        if self.expressions.is_empty() {
            return Some(self.clone());
        }
        // Malformed Accept headers are rejected by the dispatcher before
        // conditions run; a failed parse here simply never matches.
        let accepted = Self::accepted_types(request)?;
        let matched: Vec<MediaTypeExpression> = self
            .expressions
            .iter()
            .filter(|e| e.matches_accepted(&accepted))
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

    fn compare(&self, other: &Self, request: &RouteRequest) -> Ordering {
        let accepted = match Self::accepted_types(request) {
            Some(accepted) => accepted,
            None => return Ordering::Equal,
        };
        let mine = self.types_to_compare();
        let theirs = other.types_to_compare();
        for accept in &accepted {
            let ord = Self::compare_found(
                &mine,
                Self::index_of_equal(&mine, accept),
                &theirs,
                Self::index_of_equal(&theirs, accept),
            );
            if ord != Ordering::Equal {
                return ord;
            }
            let ord = Self::compare_found(
                &mine,
                Self::index_of_included(&mine, accept),
                &theirs,
                Self::index_of_included(&theirs, accept),
            );
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl fmt::Display for ProducesCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(" || "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;

    fn request(accept: Option<&str>) -> RouteRequest {
        let mut builder = RouteRequest::builder(HttpMethod::Get, "/");
        if let Some(a) = accept {
            builder = builder.header("accept", a);
        }
        builder.build()
    }

    #[test]
    fn test_empty_matches_any_accept() {
        let cond = ProducesCondition::default();
        assert!(cond.matching(&request(Some("text/html"))).is_some());
        assert!(cond.matching(&request(None)).is_some());
    }

    #[test]
    fn test_missing_accept_accepts_everything() {
        let cond = ProducesCondition::new(["application/json"]).unwrap();
        assert!(cond.matching(&request(None)).is_some());
    }

    #[test]
    fn test_compatible_accept_matches() {
        let cond = ProducesCondition::new(["application/json"]).unwrap();
        assert!(cond.matching(&request(Some("application/json"))).is_some());
        assert!(cond.matching(&request(Some("application/*"))).is_some());
        assert!(cond.matching(&request(Some("text/html"))).is_none());
    }

    #[test]
    fn test_narrows_to_compatible_expressions() {
        let cond = ProducesCondition::new(["application/json", "text/html"]).unwrap();
        let narrowed = cond.matching(&request(Some("text/*"))).unwrap();
        assert_eq!(
            narrowed.producible_media_types(),
            vec![MediaType::new("text", "html")]
        );
    }

    #[test]
    fn test_negated_expression() {
        let cond = ProducesCondition::new(["!text/html"]).unwrap();
        assert!(cond.matching(&request(Some("text/html"))).is_none());
        assert!(cond.matching(&request(Some("application/json"))).is_some());
    }

    #[test]
    fn test_malformed_accept_fails() {
        let cond = ProducesCondition::new(["application/json"]).unwrap();
        assert!(cond.matching(&request(Some("no-slash-here"))).is_none());
    }

    #[test]
    fn test_combine_other_wins_when_non_empty() {
        let component = ProducesCondition::new(["text/html"]).unwrap();
        let operation = ProducesCondition::new(["application/json"]).unwrap();
        assert_eq!(
            component.combine(&operation).producible_media_types(),
            vec![MediaType::new("application", "json")]
        );
        assert_eq!(
            component.combine(&ProducesCondition::default()),
            component
        );
    }

    #[test]
    fn test_compare_exact_type_beats_compatible() {
        let req = request(Some("application/json"));
        let exact = ProducesCondition::new(["application/json"]).unwrap();
        let loose = ProducesCondition::new(["application/*"]).unwrap();
        assert_eq!(exact.compare(&loose, &req), Ordering::Less);
        assert_eq!(loose.compare(&exact, &req), Ordering::Greater);
    }

    #[test]
    fn test_compare_follows_quality_order() {
        // The client prefers html; the handler declaring html should rank
        // first even though both candidates match.
        let req = request(Some("text/html, application/json;q=0.5"));
        let html = ProducesCondition::new(["text/html"]).unwrap();
        let json = ProducesCondition::new(["application/json"]).unwrap();
        assert_eq!(html.compare(&json, &req), Ordering::Less);
    }

    #[test]
    fn test_compare_empty_stands_for_wildcard() {
        let req = request(Some("application/json"));
        let exact = ProducesCondition::new(["application/json"]).unwrap();
        let empty = ProducesCondition::default();
        assert_eq!(exact.compare(&empty, &req), Ordering::Less);
    }

    #[test]
    fn test_invalid_expression_is_rejected() {
        assert!(ProducesCondition::new(["texthtml"]).is_err());
    }
}
