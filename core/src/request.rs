//! Request abstraction the engine matches against.
//!
//! The transport layer owns header parsing and path normalization; this type
//! just carries the already-decoded data. Header names are lowercased on
//! insertion so lookups are case-insensitive.

use std::collections::HashMap;

use crate::media_type::{InvalidMediaType, MediaType};
use crate::method::HttpMethod;

/// An inbound request as seen by the dispatch engine.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, Vec<String>>,
    query: HashMap<String, Vec<String>>,
}

impl RouteRequest {
    /// Create a builder with the given method and path.
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> RouteRequestBuilder {
        RouteRequestBuilder {
            request: RouteRequest {
                method,
                path: path.into(),
                headers: HashMap::new(),
                query: HashMap::new(),
            },
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The normalized request path (no query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a header, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|vs| vs.first())
            .map(String::as_str)
    }

    /// All values of a header, by case-insensitive name.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// All values of a query parameter (name is case-sensitive).
    #[must_use]
    pub fn query_values(&self, name: &str) -> Option<&[String]> {
        self.query.get(name).map(Vec::as_slice)
    }

    /// The declared request body type, parsed from `Content-Type`.
    ///
    /// `Ok(None)` when the header is absent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMediaType`] for an unparseable header value.
    pub fn content_type(&self) -> Result<Option<MediaType>, InvalidMediaType> {
        self.header("content-type")
            .map(MediaType::parse)
            .transpose()
    }

    /// The client-acceptable types from `Accept`, in declared order.
    ///
    /// An absent or empty `Accept` header means accept-all, reported as
    /// `[*/*]`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMediaType`] for an unparseable header value.
    pub fn accepted_types(&self) -> Result<Vec<MediaType>, InvalidMediaType> {
        let mut accepted = Vec::new();
        if let Some(values) = self.header_values("accept") {
            for value in values {
                accepted.extend(MediaType::parse_list(value)?);
            }
        }
        if accepted.is_empty() {
            accepted.push(MediaType::all());
        }
        Ok(accepted)
    }

    /// Whether this is a CORS pre-flight probe: an OPTIONS request carrying
    /// both `Origin` and `Access-Control-Request-Method`.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        self.method == HttpMethod::Options
            && self.header("origin").is_some()
            && self.header("access-control-request-method").is_some()
    }
}

/// Builder for [`RouteRequest`].
#[derive(Debug)]
pub struct RouteRequestBuilder {
    request: RouteRequest,
}

impl RouteRequestBuilder {
    /// Append a header value (name lowercased for case-insensitive lookup).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .entry(name.into().to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Append a query parameter value.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .query
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> RouteRequest {
        self.request
    }
}
