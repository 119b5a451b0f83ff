//! ruta - HTTP request mapping and dispatch engine
//!
//! A routing engine that resolves requests to handlers the way annotation-
//! driven web frameworks do: each route is a composite [`Mapping`] of six
//! conditions (paths, methods, params, headers, consumes, produces), all of
//! which must accept a request, and the most specific match wins.
//!
//! # Architecture
//!
//! - [`Mapping`] — one route shape: six conditions plus an optional name
//! - [`RequestCondition`] — the per-dimension contract: narrowing match,
//!   combination, request-specific comparison
//! - [`MappingRegistry`] — concurrent store with a direct-URL fast path
//! - [`Dispatcher`] — best-match resolution and near-miss diagnosis
//!
//! # Key Design Points
//!
//! 1. **Narrowing matches**: a condition never answers just yes/no; it
//!    returns a copy holding only the sub-expressions that matched, so the
//!    later specificity comparison is relative to the actual request.
//!
//! 2. **Diagnosis over 404**: when nothing matches, the dispatcher
//!    re-examines mappings whose patterns cover the path and reports the
//!    closest miss (wrong method, unsupported body, unacceptable response,
//!    unsatisfied parameters) in that fixed precedence.
//!
//! 3. **One lock, whole lookup**: every derived index lives under a single
//!    `RwLock` and a lookup holds the read guard end to end, so a resolve
//!    never observes a half-registered mapping.
//!
//! # Example
//!
//! ```
//! use ruta::prelude::*;
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(
//!     Mapping::builder()
//!         .paths(["/user/{id}"])
//!         .methods([HttpMethod::Get])
//!         .produces(["application/json"])
//!         .build()
//!         .unwrap(),
//!     HandlerRef::new("users", "get"),
//! ).unwrap();
//!
//! let request = RouteRequest::builder(HttpMethod::Get, "/user/42").build();
//! match dispatcher.resolve(&request).unwrap() {
//!     Resolution::Match(m) => {
//!         assert_eq!(m.handler(), &HandlerRef::new("users", "get"));
//!         assert_eq!(m.path_variables()["id"], "42");
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Features
//!
//! - `config` — declarative [`RouteTable`](config::RouteTable) loading via
//!   serde

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod condition;
mod cors;
mod dispatch;
mod expression;
mod handler;
mod mapping;
mod media_type;
mod method;
pub mod path;
mod registry;
mod request;

#[cfg(feature = "config")]
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Conditions
pub use condition::{
    ConsumesCondition, HeadersCondition, MethodsCondition, ParamsCondition, PatternsCondition,
    ProducesCondition, RequestCondition,
};

// Core types
pub use cors::CorsPolicy;
pub use expression::NameValueExpression;
pub use handler::HandlerRef;
pub use mapping::{ConfigError, Mapping, MappingBuilder};
pub use media_type::{InvalidMediaType, MediaType};
pub use method::HttpMethod;
pub use request::{RouteRequest, RouteRequestBuilder};

// Registry and dispatch
pub use dispatch::{Dispatcher, OptionsPolicy, ResolveError, ResolvedMatch, Resolution};
pub use registry::{MappingRegistration, MappingRegistry, RegistryError};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ruta::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CorsPolicy,
        Dispatcher,
        HandlerRef,
        HttpMethod,
        Mapping,
        MappingRegistry,
        MediaType,
        OptionsPolicy,
        RequestCondition,
        Resolution,
        ResolveError,
        RouteRequest,
    };
}
