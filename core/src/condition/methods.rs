//! HTTP method condition.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::condition::RequestCondition;
use crate::method::HttpMethod;
use crate::request::RouteRequest;

/// A set of allowed methods. Empty = wildcard (every method matches).
///
/// Two allowances beyond plain membership:
///
/// - HEAD matches a mapping that declares GET (narrowing to GET).
/// - OPTIONS does NOT get a free pass: a non-empty set without OPTIONS
///   fails OPTIONS requests, leaving them to the dispatcher's OPTIONS
///   policy and pre-flight handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MethodsCondition {
    methods: BTreeSet<HttpMethod>,
}

impl MethodsCondition {
    /// Create from a set of methods.
    pub fn new<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = HttpMethod>,
    {
        Self {
            methods: methods.into_iter().collect(),
        }
    }

    /// The declared methods.
    #[must_use]
    pub fn methods(&self) -> &BTreeSet<HttpMethod> {
        &self.methods
    }

    fn of(method: HttpMethod) -> Self {
        Self {
            methods: BTreeSet::from([method]),
        }
    }
}

impl RequestCondition for MethodsCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        if self.methods.is_empty() {
            return Some(self.clone());
        }
        let method = request.method();
        if self.methods.contains(&method) {
            return Some(Self::of(method));
        }
        if method == HttpMethod::Head && self.methods.contains(&HttpMethod::Get) {
            return Some(Self::of(HttpMethod::Get));
        }
        None
    }

    fn combine(&self, other: &Self) -> Self {
        Self {
            methods: self.methods.union(&other.methods).copied().collect(),
        }
    }

    fn compare(&self, other: &Self, _request: &RouteRequest) -> Ordering {
        // Fewer declared methods = more specific; wildcard (empty) is the
        // least specific because it narrowed to nothing concrete.
        match (self.methods.is_empty(), other.methods.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.methods.len().cmp(&other.methods.len()),
        }
    }

    fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Display for MethodsCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.methods.iter().map(|m| m.as_str()).collect();
        write!(f, "[{}]", tokens.join(" || "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod) -> RouteRequest {
        RouteRequest::builder(method, "/").build()
    }

    #[test]
    fn test_empty_is_wildcard() {
        let cond = MethodsCondition::default();
        assert!(cond.matching(&request(HttpMethod::Get)).is_some());
        assert!(cond.matching(&request(HttpMethod::Options)).is_some());
    }

    #[test]
    fn test_membership_narrows_to_single() {
        let cond = MethodsCondition::new([HttpMethod::Get, HttpMethod::Post]);
        let narrowed = cond.matching(&request(HttpMethod::Post)).unwrap();
        assert_eq!(narrowed.methods().len(), 1);
        assert!(narrowed.methods().contains(&HttpMethod::Post));
    }

    #[test]
    fn test_non_member_fails() {
        let cond = MethodsCondition::new([HttpMethod::Get]);
        assert!(cond.matching(&request(HttpMethod::Delete)).is_none());
    }

    #[test]
    fn test_head_matches_get() {
        let cond = MethodsCondition::new([HttpMethod::Get]);
        let narrowed = cond.matching(&request(HttpMethod::Head)).unwrap();
        assert!(narrowed.methods().contains(&HttpMethod::Get));
    }

    #[test]
    fn test_options_not_implicitly_allowed() {
        let cond = MethodsCondition::new([HttpMethod::Get, HttpMethod::Post]);
        assert!(cond.matching(&request(HttpMethod::Options)).is_none());

        let with_options = MethodsCondition::new([HttpMethod::Options]);
        assert!(with_options.matching(&request(HttpMethod::Options)).is_some());
    }

    #[test]
    fn test_combine_is_union() {
        let a = MethodsCondition::new([HttpMethod::Get]);
        let b = MethodsCondition::new([HttpMethod::Post]);
        assert_eq!(a.combine(&b).methods().len(), 2);
    }

    #[test]
    fn test_compare_specific_beats_wildcard() {
        let req = request(HttpMethod::Get);
        let specific = MethodsCondition::new([HttpMethod::Get]);
        let wildcard = MethodsCondition::default();
        assert_eq!(specific.compare(&wildcard, &req), Ordering::Less);
        assert_eq!(wildcard.compare(&specific, &req), Ordering::Greater);
        assert_eq!(specific.compare(&specific.clone(), &req), Ordering::Equal);
    }
}
