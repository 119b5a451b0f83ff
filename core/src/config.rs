//! Declarative route tables.
//!
//! Mirrors the builder surface as plain data so route sets can live in
//! YAML or JSON files. Only available with the `config` feature.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::cors::CorsPolicy;
use crate::dispatch::Dispatcher;
use crate::handler::HandlerRef;
use crate::mapping::{ConfigError, Mapping};
use crate::method::HttpMethod;
use crate::registry::RegistryError;

/// Failure to load a route table into a dispatcher.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A route's declarative form did not build a valid mapping.
    #[error("route #{index}: {source}")]
    InvalidRoute {
        /// Zero-based position of the route in the table.
        index: usize,
        /// The underlying build failure.
        #[source]
        source: ConfigError,
    },
    /// A route conflicted with an already registered mapping.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A deserializable set of routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteTable {
    /// The routes, in declaration order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RouteTable {
    /// Build every route and register it with the dispatcher, returning the
    /// number of routes registered.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] on the first route that fails to build or
    /// register; earlier routes stay registered.
    pub fn load_into(&self, dispatcher: &Dispatcher) -> Result<usize, LoadError> {
        for (index, route) in self.routes.iter().enumerate() {
            let (mapping, handler, cors) = route
                .build()
                .map_err(|source| LoadError::InvalidRoute { index, source })?;
            match cors {
                Some(cors) => dispatcher.register_with_cors(mapping, handler, cors)?,
                None => dispatcher.register(mapping, handler)?,
            }
        }
        info!(routes = self.routes.len(), "loaded route table");
        Ok(self.routes.len())
    }
}

/// One route in declarative form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Optional mapping name.
    #[serde(default)]
    pub name: Option<String>,
    /// Path patterns.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Allowed method tokens.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Query-parameter expressions.
    #[serde(default)]
    pub params: Vec<String>,
    /// Header expressions.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Consumable media types.
    #[serde(default)]
    pub consumes: Vec<String>,
    /// Producible media types.
    #[serde(default)]
    pub produces: Vec<String>,
    /// The handler this route targets.
    pub handler: HandlerConfig,
    /// Optional handler-level CORS policy.
    #[serde(default)]
    pub cors: Option<CorsConfig>,
}

impl RouteConfig {
    /// Build the mapping, handler reference, and CORS policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown method token or invalid
    /// media-type expression.
    pub fn build(&self) -> Result<(Mapping, HandlerRef, Option<CorsPolicy>), ConfigError> {
        let methods = self
            .methods
            .iter()
            .map(|m| m.parse::<HttpMethod>())
            .collect::<Result<Vec<_>, _>>()?;
        let mut builder = Mapping::builder()
            .paths(self.paths.iter().cloned())
            .methods(methods)
            .params(self.params.iter().cloned())
            .headers(self.headers.iter().cloned())
            .consumes(self.consumes.iter().cloned())
            .produces(self.produces.iter().cloned());
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        let mapping = builder.build()?;
        let handler = HandlerRef::new(&self.handler.component, &self.handler.operation);
        let cors = self.cors.as_ref().map(CorsConfig::to_policy);
        Ok((mapping, handler, cors))
    }
}

/// Deserializable handler reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// The owning component.
    pub component: String,
    /// The operation within the component.
    pub operation: String,
}

/// Deserializable CORS policy; omitted fields take the permissive default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed `Origin` values.
    #[serde(default = "wildcard")]
    pub allowed_origins: Vec<String>,
    /// Allowed methods for the actual request.
    #[serde(default = "wildcard")]
    pub allowed_methods: Vec<String>,
    /// Allowed request headers.
    #[serde(default = "wildcard")]
    pub allowed_headers: Vec<String>,
    /// Whether credentialed requests are allowed.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

impl CorsConfig {
    fn to_policy(&self) -> CorsPolicy {
        CorsPolicy {
            allowed_origins: self.allowed_origins.clone(),
            allowed_methods: self.allowed_methods.clone(),
            allowed_headers: self.allowed_headers.clone(),
            allow_credentials: self.allow_credentials,
        }
    }
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Resolution;
    use crate::request::RouteRequest;

    const TABLE: &str = r#"
routes:
  - name: list-items
    paths: ["/items"]
    methods: [GET]
    produces: ["application/json"]
    handler: { component: items, operation: list }
  - paths: ["/items"]
    methods: [POST]
    consumes: ["application/json"]
    handler: { component: items, operation: create }
    cors:
      allowed_origins: ["https://example.com"]
      allow_credentials: false
"#;

    #[test]
    fn test_yaml_table_loads() {
        let table: RouteTable = serde_yaml::from_str(TABLE).unwrap();
        let dispatcher = Dispatcher::new();
        assert_eq!(table.load_into(&dispatcher).unwrap(), 2);
        assert_eq!(dispatcher.registry().len(), 2);

        let request = RouteRequest::builder(HttpMethod::Get, "/items").build();
        match dispatcher.resolve(&request).unwrap() {
            Resolution::Match(m) => {
                assert_eq!(m.handler(), &HandlerRef::new("items", "list"));
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_cors_defaults_fill_in() {
        let table: RouteTable = serde_yaml::from_str(TABLE).unwrap();
        let dispatcher = Dispatcher::new();
        table.load_into(&dispatcher).unwrap();
        let policy = dispatcher.cors_policy(&HandlerRef::new("items", "create"));
        assert_eq!(policy.allowed_origins, vec!["https://example.com"]);
        assert_eq!(policy.allowed_methods, vec!["*"]);
        assert!(!policy.allow_credentials);
    }

    #[test]
    fn test_named_route_enters_name_index() {
        let table: RouteTable = serde_yaml::from_str(TABLE).unwrap();
        let dispatcher = Dispatcher::new();
        table.load_into(&dispatcher).unwrap();
        assert_eq!(
            dispatcher.registry().handlers_by_name("list-items"),
            vec![HandlerRef::new("items", "list")]
        );
    }

    #[test]
    fn test_unknown_method_reports_route_index() {
        let yaml = r#"
routes:
  - paths: ["/x"]
    methods: [FETCH]
    handler: { component: c, operation: o }
"#;
        let table: RouteTable = serde_yaml::from_str(yaml).unwrap();
        let err = table.load_into(&Dispatcher::new()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRoute { index: 0, .. }));
    }

    #[test]
    fn test_json_table_loads() {
        let json = r#"{
            "routes": [
                { "paths": ["/ping"], "handler": { "component": "ops", "operation": "ping" } }
            ]
        }"#;
        let table: RouteTable = serde_json::from_str(json).unwrap();
        let dispatcher = Dispatcher::new();
        assert_eq!(table.load_into(&dispatcher).unwrap(), 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
routes:
  - paths: ["/x"]
    handler: { component: c, operation: o }
    verbs: [GET]
"#;
        assert!(serde_yaml::from_str::<RouteTable>(yaml).is_err());
    }
}
