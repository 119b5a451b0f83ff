//! The six condition kinds that make up a mapping.
//!
//! Every kind implements [`RequestCondition`]: narrowing match, dimension
//! combination, and per-request specificity comparison. The set is closed,
//! so each kind is a concrete type and the composite mapping owns one of
//! each.

use std::cmp::Ordering;

use crate::request::RouteRequest;

mod consumes;
mod headers;
mod media_expr;
mod methods;
mod params;
mod patterns;
mod produces;

pub use consumes::ConsumesCondition;
pub use headers::HeadersCondition;
pub use methods::MethodsCondition;
pub use params::ParamsCondition;
pub use patterns::PatternsCondition;
pub use produces::ProducesCondition;

/// Uniform capability contract for one matching dimension.
pub trait RequestCondition: Sized {
    /// Check the request against this condition.
    ///
    /// Returns a possibly-narrowed copy containing only the
    /// sub-expressions that matched, or `None` if the condition fails as a
    /// whole. An empty condition matches every request and narrows to
    /// itself.
    fn matching(&self, request: &RouteRequest) -> Option<Self>;

    /// Combine with another instance of the same kind, e.g. when merging a
    /// component-level mapping with an operation-level one.
    fn combine(&self, other: &Self) -> Self;

    /// Compare specificity in the context of a request. `Less` means this
    /// condition is the more specific (better) one. Both instances are
    /// assumed to be the narrowed output of [`matching`](Self::matching).
    fn compare(&self, other: &Self, request: &RouteRequest) -> Ordering;

    /// Whether the condition holds no expressions (and so matches
    /// everything).
    fn is_empty(&self) -> bool;
}
