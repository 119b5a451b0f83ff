//! Path-pattern condition.

use std::cmp::Ordering;
use std::fmt;

use crate::condition::RequestCondition;
use crate::path;
use crate::request::RouteRequest;

/// A set of path patterns. The condition matches iff at least one pattern
/// matches the request path; an empty set matches every path.
///
/// Patterns keep their declared order (deduplicated); a narrowed instance
/// holds only the patterns that matched, sorted most-specific first, so the
/// head is the best matching pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PatternsCondition {
    patterns: Vec<String>,
}

impl PatternsCondition {
    /// Create from pattern strings; duplicates are dropped, order kept.
    /// Patterns without a leading `/` get one prepended.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            let pattern = if pattern.is_empty() || pattern.starts_with('/') {
                pattern
            } else {
                format!("/{pattern}")
            };
            if !out.contains(&pattern) {
                out.push(pattern);
            }
        }
        Self { patterns: out }
    }

    /// The patterns in this condition.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The best (first) pattern of a narrowed condition, if any.
    #[must_use]
    pub fn best_pattern(&self) -> Option<&str> {
        self.patterns.first().map(String::as_str)
    }

    /// Patterns that carry no wildcard syntax, usable as direct-URL index
    /// keys.
    #[must_use]
    pub fn direct_urls(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| !path::is_pattern(p))
            .cloned()
            .collect()
    }

    fn matching_pattern(pattern: &str, lookup: &str) -> bool {
        pattern == lookup || path::matches(pattern, lookup)
    }
}

impl RequestCondition for PatternsCondition {
    fn matching(&self, request: &RouteRequest) -> Option<Self> {
        if self.patterns.is_empty() {
            return Some(self.clone());
        }
        let lookup = request.path();
        let mut matched: Vec<String> = self
            .patterns
            .iter()
            .filter(|p| Self::matching_pattern(p, lookup))
            .cloned()
            .collect();
        if matched.is_empty() {
            return None;
        }
        matched.sort_by(|a, b| path::compare(a, b, lookup));
        Some(Self { patterns: matched })
    }

    fn combine(&self, other: &Self) -> Self {
        Self::new(self.patterns.iter().chain(&other.patterns).cloned())
    }

    fn compare(&self, other: &Self, request: &RouteRequest) -> Ordering {
        let lookup = request.path();
        let mut mine = self.patterns.iter();
        let mut theirs = other.patterns.iter();
        loop {
            match (mine.next(), theirs.next()) {
                (Some(a), Some(b)) => {
                    let ord = path::compare(a, b, lookup);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                // More matched patterns = more specific
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Display for PatternsCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.patterns.join(" || "))
    }
}
