//! Query-parameter condition.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::condition::RequestCondition;
use crate::expression::NameValueExpression;
use crate::request::RouteRequest;

/// A conjunction of query-parameter expressions: the request matches iff
/// **all** expressions hold. Parameter names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParamsCondition {
    expressions: BTreeSet<NameValueExpression>,
}

impl ParamsCondition {
    /// Parse expression strings (`name`, `!name`, `name=value`,
    /// `name!=value`).
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            expressions: params
                .into_iter()
                .map(|p| NameValueExpression::parse(p.as_ref(), false))
                .collect(),
        }
    }

    /// The contained expressions.
    #[must_use]
    pub fn expressions(&self) -> &BTreeSet<NameValueExpression> {
        &self.expressions
    }
}

impl RequestCondition for ParamsCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        let all_hold = self
            .expressions
            .iter()
            .all(|e| e.evaluate(request.query_values(e.name())));
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
        // More expressions = more constrained = more specific.
        other.expressions.len().cmp(&self.expressions.len())
    }

    fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl fmt::Display for ParamsCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(" && "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;

    fn request(pairs: &[(&str, &str)]) -> RouteRequest {
        let mut builder = RouteRequest::builder(HttpMethod::Get, "/");
        for (k, v) in pairs {
            builder = builder.query(*k, *v);
        }
        builder.build()
    }

    #[test]
    fn test_empty_matches() {
        assert!(ParamsCondition::default().matching(&request(&[])).is_some());
    }

    #[test]
    fn test_all_expressions_must_hold() {
        let cond = ParamsCondition::new(["mode=fast", "debug"]);
        assert!(cond
            .matching(&request(&[("mode", "fast"), ("debug", "1")]))
            .is_some());
        assert!(cond.matching(&request(&[("mode", "fast")])).is_none());
    }

    #[test]
    fn test_negation() {
        let cond = ParamsCondition::new(["!internal"]);
        assert!(cond.matching(&request(&[])).is_some());
        assert!(cond.matching(&request(&[("internal", "1")])).is_none());
    }

    #[test]
    fn test_names_case_sensitive() {
        let cond = ParamsCondition::new(["Mode=fast"]);
        assert!(cond.matching(&request(&[("mode", "fast")])).is_none());
    }

    #[test]
    fn test_combine_unions_and_dedupes() {
        let a = ParamsCondition::new(["mode=fast"]);
        let b = ParamsCondition::new(["mode=fast", "debug"]);
        assert_eq!(a.combine(&b).expressions().len(), 2);
    }

    #[test]
    fn test_compare_more_expressions_first() {
        let req = request(&[]);
        let two = ParamsCondition::new(["a", "b"]);
        let one = ParamsCondition::new(["a"]);
        assert_eq!(two.compare(&one, &req), Ordering::Less);
        assert_eq!(one.compare(&two, &req), Ordering::Greater);
    }
}
