//! Cross-origin policy value type.
//!
//! The engine does not evaluate CORS; it only stores a policy per handler so
//! the transport layer can answer pre-flight probes. The permissive default
//! is an explicit value passed to the dispatcher, never process-global
//! state.

/// A CORS policy attached to a handler at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Allowed `Origin` values; `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Allowed methods for the actual request; `*` allows any.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers; `*` allows any.
    pub allowed_headers: Vec<String>,
    /// Whether credentialed requests are allowed.
    pub allow_credentials: bool,
}

impl CorsPolicy {
    /// The permissive policy: any origin, method, and header, with
    /// credentials.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}
