//! Header condition.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::condition::RequestCondition;
use crate::expression::NameValueExpression;
use crate::request::RouteRequest;

/// A conjunction of header expressions: the request matches iff **all**
/// expressions hold. Header names are matched case-insensitively.
///
/// Expressions on `Accept` and `Content-Type` are dropped at construction;
/// media-type constraints belong to the produces/consumes conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HeadersCondition {
    expressions: BTreeSet<NameValueExpression>,
}

impl HeadersCondition {
    /// Parse expression strings (`name`, `!name`, `name=value`,
    /// `name!=value`), lowercasing names.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            expressions: headers
                .into_iter()
                .map(|h| NameValueExpression::parse(h.as_ref(), true))
                .filter(|e| e.name() != "accept" && e.name() != "content-type")
                .collect(),
        }
    }

    /// The contained expressions.
    #[must_use]
    pub fn expressions(&self) -> &BTreeSet<NameValueExpression> {
        &self.expressions
    }
}

impl RequestCondition for HeadersCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        let all_hold = self
            .expressions
            .iter()
            .all(|e| e.evaluate(request.header_values(e.name())));
        all_hold.then(|| self.clone())
    }

    fn combine(&self, other: &Self) -> Self {
        Self {
            expressions: self
                .expressions
                .union(&other.expressions)
                .cloned()
                .collect(),
        }
    }

    fn compare(&self, other: &Self, _request: &RouteRequest) -> Ordering {
        other.expressions.len().cmp(&self.expressions.len())
    }

    fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl fmt::Display for HeadersCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(" && "))
    }
}
