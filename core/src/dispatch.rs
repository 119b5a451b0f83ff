//! Best-match resolution and no-match diagnosis.
//!
//! The dispatcher owns a [`MappingRegistry`] and answers one question: for
//! this request, which handler wins? When nothing matches it re-examines
//! the near misses to say *why*, in a fixed precedence: wrong method, then
//! unsupported body type, then unacceptable response type, then unsatisfied
//! parameters.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, trace};

use crate::condition::RequestCondition;
use crate::cors::CorsPolicy;
use crate::handler::HandlerRef;
use crate::mapping::Mapping;
use crate::media_type::{InvalidMediaType, MediaType};
use crate::method::HttpMethod;
use crate::path;
use crate::registry::{Indices, MappingRegistry, RegistryError};
use crate::request::RouteRequest;

/// How the dispatcher answers plain (non-preflight) OPTIONS requests that
/// no mapping claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionsPolicy {
    /// Answer with the set of methods the matching patterns allow.
    #[default]
    Synthesize,
    /// Treat OPTIONS like any other method and report the mismatch.
    Diagnose,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one mapping won.
    Match(ResolvedMatch),
    /// A CORS pre-flight request hit two equally specific mappings; the
    /// caller should answer the pre-flight permissively and let the actual
    /// request fail instead.
    PreflightAmbiguous,
    /// A synthesized OPTIONS answer listing the allowed methods.
    Options {
        /// Methods the path's mappings accept.
        allowed: BTreeSet<HttpMethod>,
    },
}

/// The winning mapping plus everything extracted from the match.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch {
    handler: HandlerRef,
    mapping: Mapping,
    best_pattern: Option<String>,
    path_variables: HashMap<String, String>,
}

impl ResolvedMatch {
    /// The handler to invoke.
    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// The narrowed mapping that won.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// The most specific pattern that matched, if the mapping declared any.
    #[must_use]
    pub fn best_pattern(&self) -> Option<&str> {
        self.best_pattern.as_deref()
    }

    /// Values captured by `{var}` segments of the best pattern.
    #[must_use]
    pub fn path_variables(&self) -> &HashMap<String, String> {
        &self.path_variables
    }
}

/// Why no handler was resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No mapping's patterns cover the request path.
    #[error("no mapping matches the request path")]
    NotFound,
    /// Patterns matched but the method is not allowed by any of them.
    #[error("method not allowed; allowed: {allowed:?}")]
    MethodNotAllowed {
        /// Methods the matching mappings would accept.
        allowed: BTreeSet<HttpMethod>,
    },
    /// Patterns and method matched but no mapping consumes the body type.
    #[error("unsupported media type")]
    UnsupportedMediaType {
        /// The request's declared body type.
        content_type: Option<MediaType>,
        /// Body types the matching mappings would consume.
        supported: Vec<MediaType>,
    },
    /// Patterns, method, and body matched but nothing acceptable can be
    /// produced.
    #[error("not acceptable")]
    NotAcceptable {
        /// Types the matching mappings can produce.
        producible: Vec<MediaType>,
    },
    /// Everything else matched but a parameter or header expression failed.
    #[error("unsatisfied parameter or header conditions")]
    UnsatisfiedParameters {
        /// Display forms of the failing conditions.
        conditions: Vec<String>,
    },
    /// The request carried an unparseable `Content-Type` or `Accept`.
    #[error(transparent)]
    MalformedMediaType(#[from] InvalidMediaType),
    /// Two mappings matched and neither is more specific.
    #[error("ambiguous mapping: {first} and {second} are equally specific")]
    Ambiguous {
        /// Display form of one tied mapping.
        first: String,
        /// Display form of the other tied mapping.
        second: String,
    },
}

/// Resolves requests against a registry of mappings.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: MappingRegistry,
    options_policy: OptionsPolicy,
    default_cors: CorsPolicy,
}

impl Dispatcher {
    /// Create a dispatcher with an empty registry and default policies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OPTIONS policy.
    #[must_use]
    pub fn with_options_policy(mut self, policy: OptionsPolicy) -> Self {
        self.options_policy = policy;
        self
    }

    /// Set the CORS policy used for handlers without their own.
    #[must_use]
    pub fn with_default_cors(mut self, cors: CorsPolicy) -> Self {
        self.default_cors = cors;
        self
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Register a mapping. See [`MappingRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AmbiguousMapping`] on a conflicting
    /// registration.
    pub fn register(&self, mapping: Mapping, handler: HandlerRef) -> Result<(), RegistryError> {
        self.registry.register(mapping, handler)
    }

    /// Register a mapping with a handler CORS policy. See
    /// [`MappingRegistry::register_with_cors`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AmbiguousMapping`] on a conflicting
    /// registration.
    pub fn register_with_cors(
        &self,
        mapping: Mapping,
        handler: HandlerRef,
        cors: CorsPolicy,
    ) -> Result<(), RegistryError> {
        self.registry.register_with_cors(mapping, handler, cors)
    }

    /// Remove a mapping. See [`MappingRegistry::unregister`].
    pub fn unregister(&self, mapping: &Mapping) {
        self.registry.unregister(mapping);
    }

    /// The CORS policy for a handler: its registered policy, or the
    /// dispatcher default.
    #[must_use]
    pub fn cors_policy(&self, handler: &HandlerRef) -> CorsPolicy {
        self.registry
            .cors_policy(handler)
            .unwrap_or_else(|| self.default_cors.clone())
    }

    /// Resolve the best handler for a request.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] describing the closest miss when no
    /// mapping matches, or [`ResolveError::Ambiguous`] when two matches tie.
    pub fn resolve(&self, request: &RouteRequest) -> Result<Resolution, ResolveError> {
        // Reject malformed media-type headers up front so conditions can
        // treat parse failures as plain non-matches.
        request.content_type()?;
        request.accepted_types()?;

        let inner = self.registry.read();

        let mut matches = Self::matching_candidates(
            inner.direct_candidates(request.path()).iter(),
            &inner,
            request,
        );
        if matches.is_empty() {
            matches = Self::matching_candidates(inner.all_mappings(), &inner, request);
        }
        trace!(path = request.path(), candidates = matches.len(), "gathered candidates");
        if matches.is_empty() {
            return Err(self.diagnose(&inner, request));
        }

        matches.sort_by(|a, b| a.mapping.compare_to(&b.mapping, request));
        if matches.len() > 1 {
            let best = &matches[0];
            let second = &matches[1];
            if best.mapping.compare_to(&second.mapping, request).is_eq() {
                if request.is_preflight() {
                    return Ok(Resolution::PreflightAmbiguous);
                }
                return Err(ResolveError::Ambiguous {
                    first: format!("{} -> {}", best.mapping, best.handler),
                    second: format!("{} -> {}", second.mapping, second.handler),
                });
            }
        }

        let best = matches.swap_remove(0);
        let best_pattern = best.mapping.patterns().best_pattern().map(str::to_string);
        let path_variables = best_pattern
            .as_deref()
            .and_then(|p| path::extract_variables(p, request.path()))
            .unwrap_or_default();
        debug!(handler = %best.handler, pattern = ?best_pattern, "resolved request");
        Ok(Resolution::Match(ResolvedMatch {
            handler: best.handler,
            mapping: best.mapping,
            best_pattern,
            path_variables,
        }))
    }

    /// Narrow each candidate against the request, keeping the handler from
    /// the registered form. Narrowing rewrites the mapping's conditions, so
    /// the registry key cannot be recovered from the narrowed copy.
    fn matching_candidates<'a>(
        candidates: impl Iterator<Item = &'a Mapping>,
        inner: &Indices,
        request: &RouteRequest,
    ) -> Vec<Candidate> {
        candidates
            .filter_map(|m| {
                let mapping = m.matching(request)?;
                let handler = inner.handler_of(m)?.clone();
                Some(Candidate { mapping, handler })
            })
            .collect()
    }

    /// Explain why nothing matched, checking mismatch kinds in precedence
    /// order against the mappings whose patterns cover the path.
    fn diagnose(&self, inner: &Indices, request: &RouteRequest) -> ResolveError {
        let partials: Vec<PartialMatch> = inner
            .all_mappings()
            .filter(|m| m.patterns().matching(request).is_some())
            .map(|m| PartialMatch::new(m, request))
            .collect();
        if partials.is_empty() {
            return ResolveError::NotFound;
        }

        if partials.iter().all(|p| !p.methods_match) {
            return ResolveError::MethodNotAllowed {
                allowed: Self::allowed_methods(&partials),
            };
        }
        if partials.iter().all(|p| !p.consumes_match) {
            let supported = partials
                .iter()
                .filter(|p| p.methods_match)
                .flat_map(|p| p.mapping.consumes().consumable_media_types())
                .collect();
            return ResolveError::UnsupportedMediaType {
                content_type: request.content_type().ok().flatten(),
                supported,
            };
        }
        if partials.iter().all(|p| !p.produces_match) {
            let producible = partials
                .iter()
                .filter(|p| p.consumes_match)
                .flat_map(|p| p.mapping.produces().producible_media_types())
                .collect();
            return ResolveError::NotAcceptable { producible };
        }
        if partials.iter().all(|p| !p.params_match) {
            let conditions = partials
                .iter()
                .filter(|p| p.produces_match)
                .flat_map(|p| {
                    let params = p.mapping.params();
                    let headers = p.mapping.headers();
                    let mut unmet = Vec::new();
                    if params.matching(request).is_none() {
                        unmet.push(params.to_string());
                    }
                    if headers.matching(request).is_none() {
                        unmet.push(headers.to_string());
                    }
                    unmet
                })
                .collect();
            return ResolveError::UnsatisfiedParameters { conditions };
        }
        // Every dimension matched for some partial, yet the full match came
        // up empty; that cannot happen.
        debug_assert!(false, "partial-match diagnosis found no mismatch");
        ResolveError::NotFound
    }

    fn allowed_methods(partials: &[PartialMatch<'_>]) -> BTreeSet<HttpMethod> {
        let mut allowed = BTreeSet::new();
        for partial in partials {
            let methods = partial.mapping.methods().methods();
            if methods.is_empty() {
                allowed.extend(HttpMethod::ALL);
            } else {
                allowed.extend(methods.iter().copied());
                if methods.contains(&HttpMethod::Get) {
                    allowed.insert(HttpMethod::Head);
                }
            }
        }
        allowed
    }

    /// [`resolve`](Self::resolve) with the OPTIONS policy applied: a plain
    /// OPTIONS request that would otherwise be a method mismatch gets a
    /// synthesized [`Resolution::Options`] answer built from the allowed
    /// set the diagnosis already computed.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn dispatch(&self, request: &RouteRequest) -> Result<Resolution, ResolveError> {
        match self.resolve(request) {
            Err(ResolveError::MethodNotAllowed { mut allowed })
                if self.options_policy == OptionsPolicy::Synthesize
                    && request.method() == HttpMethod::Options
                    && !request.is_preflight() =>
            {
                allowed.insert(HttpMethod::Options);
                debug!(allowed = ?allowed, "synthesized OPTIONS answer");
                Ok(Resolution::Options { allowed })
            }
            other => other,
        }
    }
}

/// One narrowed mapping paired with its handler, captured while the
/// registered form was still at hand.
struct Candidate {
    mapping: Mapping,
    handler: HandlerRef,
}

/// One near miss, with each dimension's verdict gated on the previous so a
/// later mismatch is only reported when everything before it matched.
struct PartialMatch<'a> {
    mapping: &'a Mapping,
    methods_match: bool,
    consumes_match: bool,
    produces_match: bool,
    params_match: bool,
}

impl<'a> PartialMatch<'a> {
    fn new(mapping: &'a Mapping, request: &RouteRequest) -> Self {
        let methods_match = mapping.methods().matching(request).is_some();
        let consumes_match = methods_match && mapping.consumes().matching(request).is_some();
        let produces_match = consumes_match && mapping.produces().matching(request).is_some();
        let params_match = produces_match
            && mapping.params().matching(request).is_some()
            && mapping.headers().matching(request).is_some();
        Self {
            mapping,
            methods_match,
            consumes_match,
            produces_match,
            params_match,
        }
    }
}
