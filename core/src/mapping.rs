//! The composite request mapping.
//!
//! A [`Mapping`] bundles one condition per matching dimension. All six must
//! accept a request for the mapping to match; the narrowed result carries
//! only the sub-expressions that matched, which makes later comparison
//! request-specific.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::condition::{
    ConsumesCondition, HeadersCondition, MethodsCondition, ParamsCondition, PatternsCondition,
    ProducesCondition, RequestCondition,
};
use crate::media_type::InvalidMediaType;
use crate::method::HttpMethod;
use crate::request::RouteRequest;

/// Failure to build a mapping from declarative input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A method token was not one of the known HTTP methods.
    #[error("unknown HTTP method \"{token}\"")]
    UnknownMethod {
        /// The offending token.
        token: String,
    },
    /// A consumes or produces expression was not a parseable media type.
    #[error(transparent)]
    InvalidMediaType(#[from] InvalidMediaType),
}

/// One registered route shape: six conditions and an optional name.
///
/// Equality and hashing cover the conditions only; two mappings with the
/// same conditions are the same mapping regardless of name, which is what
/// duplicate detection in the registry needs.
#[derive(Debug, Clone)]
pub struct Mapping {
    name: Option<String>,
    patterns: PatternsCondition,
    methods: MethodsCondition,
    params: ParamsCondition,
    headers: HeadersCondition,
    consumes: ConsumesCondition,
    produces: ProducesCondition,
}

impl Mapping {
    /// Start building a mapping.
    #[must_use]
    pub fn builder() -> MappingBuilder {
        MappingBuilder::default()
    }

    /// The optional mapping name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The path patterns condition.
    #[must_use]
    pub fn patterns(&self) -> &PatternsCondition {
        &self.patterns
    }

    /// The methods condition.
    #[must_use]
    pub fn methods(&self) -> &MethodsCondition {
        &self.methods
    }

    /// The query-parameter condition.
    #[must_use]
    pub fn params(&self) -> &ParamsCondition {
        &self.params
    }

    /// The headers condition.
    #[must_use]
    pub fn headers(&self) -> &HeadersCondition {
        &self.headers
    }

    /// The consumes condition.
    #[must_use]
    pub fn consumes(&self) -> &ConsumesCondition {
        &self.consumes
    }

    /// The produces condition.
    #[must_use]
    pub fn produces(&self) -> &ProducesCondition {
        &self.produces
    }

    /// Check the request against all six conditions.
    ///
    /// Returns a narrowed mapping whose conditions hold only the matched
    /// sub-expressions, or `None` if any condition fails. Cheap conditions
    /// run first; patterns run last.
    #[must_use]
    pub fn matching(&self, request: &RouteRequest) -> Option<Self> {
        let methods = self.methods.matching(request)?;
        let params = self.params.matching(request)?;
        let headers = self.headers.matching(request)?;
        let consumes = self.consumes.matching(request)?;
        let produces = self.produces.matching(request)?;
        let patterns = self.patterns.matching(request)?;
        Some(Self {
            name: self.name.clone(),
            patterns,
            methods,
            params,
            headers,
            consumes,
            produces,
        })
    }

    /// Merge a component-level mapping with an operation-level one.
    ///
    /// Patterns, methods, params, and headers take the union; consumes and
    /// produces let the operation level override; names join with `#`.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let name = match (&self.name, &other.name) {
            (Some(a), Some(b)) => Some(format!("{a}#{b}")),
            (Some(a), None) => Some(a.clone()),
            (None, b) => b.clone(),
        };
        Self {
            name,
            patterns: self.patterns.combine(&other.patterns),
            methods: self.methods.combine(&other.methods),
            params: self.params.combine(&other.params),
            headers: self.headers.combine(&other.headers),
            consumes: self.consumes.combine(&other.consumes),
            produces: self.produces.combine(&other.produces),
        }
    }

    /// Rank two narrowed mappings for the given request, most specific
    /// first. Dimensions are consulted in fixed order and the first
    /// non-equal answer wins.
    #[must_use]
    pub fn compare_to(&self, other: &Self, request: &RouteRequest) -> Ordering {
        self.patterns
            .compare(&other.patterns, request)
            .then_with(|| self.methods.compare(&other.methods, request))
            .then_with(|| self.consumes.compare(&other.consumes, request))
            .then_with(|| self.produces.compare(&other.produces, request))
            .then_with(|| self.params.compare(&other.params, request))
            .then_with(|| self.headers.compare(&other.headers, request))
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
            && self.methods == other.methods
            && self.params == other.params
            && self.headers == other.headers
            && self.consumes == other.consumes
            && self.produces == other.produces
    }
}

impl Eq for Mapping {}

impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.patterns.hash(state);
        self.methods.hash(state);
        self.params.hash(state);
        self.headers.hash(state);
        self.consumes.hash(state);
        self.produces.hash(state);
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}", self.methods, self.patterns)?;
        if !self.params.is_empty() {
            write!(f, ", params {}", self.params)?;
        }
        if !self.headers.is_empty() {
            write!(f, ", headers {}", self.headers)?;
        }
        if !self.consumes.is_empty() {
            write!(f, ", consumes {}", self.consumes)?;
        }
        if !self.produces.is_empty() {
            write!(f, ", produces {}", self.produces)?;
        }
        f.write_str("}")
    }
}

/// Builder for [`Mapping`], taking the declarative string forms.
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    name: Option<String>,
    paths: Vec<String>,
    methods: Vec<HttpMethod>,
    params: Vec<String>,
    headers: Vec<String>,
    consumes: Vec<String>,
    produces: Vec<String>,
}

impl MappingBuilder {
    /// Set the mapping name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add path patterns.
    #[must_use]
    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add allowed methods.
    #[must_use]
    pub fn methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = HttpMethod>,
    {
        self.methods.extend(methods);
        self
    }

    /// Add query-parameter expressions.
    #[must_use]
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Add header expressions.
    #[must_use]
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Add consumable media-type expressions.
    #[must_use]
    pub fn consumes<I, S>(mut self, consumes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes.extend(consumes.into_iter().map(Into::into));
        self
    }

    /// Add producible media-type expressions.
    #[must_use]
    pub fn produces<I, S>(mut self, produces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(produces.into_iter().map(Into::into));
        self
    }

    /// Build the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a consumes or produces expression is not
    /// a valid media type.
    pub fn build(self) -> Result<Mapping, ConfigError> {
        Ok(Mapping {
            name: self.name,
            patterns: PatternsCondition::new(self.paths),
            methods: MethodsCondition::new(self.methods),
            params: ParamsCondition::new(self.params),
            headers: HeadersCondition::new(self.headers),
            consumes: ConsumesCondition::new(self.consumes)?,
            produces: ProducesCondition::new(self.produces)?,
        })
    }
}
