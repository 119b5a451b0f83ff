//! Concurrent mapping registry.
//!
//! All derived indices live under one lock so readers always see a mapping
//! either fully registered or not at all. Lookups take the read lock for
//! their whole duration; registration is expected to be rare after startup.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use thiserror::Error;
use tracing::debug;

use crate::cors::CorsPolicy;
use crate::handler::HandlerRef;
use crate::mapping::Mapping;

/// Failure to register a mapping.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same mapping is already registered to a different handler.
    #[error(
        "ambiguous mapping: cannot register {candidate} to {mapping}, already registered to {existing}"
    )]
    AmbiguousMapping {
        /// Display form of the conflicting mapping.
        mapping: String,
        /// The handler already holding the mapping.
        existing: HandlerRef,
        /// The handler that lost the registration.
        candidate: HandlerRef,
    },
}

/// One registered mapping with everything derived from it.
#[derive(Debug, Clone)]
pub struct MappingRegistration {
    mapping: Mapping,
    handler: HandlerRef,
    direct_urls: Vec<String>,
}

impl MappingRegistration {
    /// The registered mapping.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// The handler the mapping routes to.
    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

#[derive(Debug, Default)]
pub(crate) struct Indices {
    registrations: HashMap<Mapping, MappingRegistration>,
    url_index: HashMap<String, Vec<Mapping>>,
    name_index: HashMap<String, Vec<HandlerRef>>,
    cors_index: HashMap<HandlerRef, CorsPolicy>,
}

impl Indices {
    /// Mappings whose pattern set contains `path` verbatim (no wildcard
    /// evaluation needed).
    pub(crate) fn direct_candidates(&self, path: &str) -> &[Mapping] {
        self.url_index.get(path).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn all_mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.registrations.keys()
    }

    pub(crate) fn handler_of(&self, mapping: &Mapping) -> Option<&HandlerRef> {
        self.registrations.get(mapping).map(|r| &r.handler)
    }

    pub(crate) fn cors_of(&self, handler: &HandlerRef) -> Option<&CorsPolicy> {
        self.cors_index.get(handler)
    }
}

/// The registry: a consistent, concurrently readable set of mappings.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    inner: RwLock<Indices>,
}

impl MappingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapping` for `handler`.
    ///
    /// Re-registering the identical mapping/handler pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AmbiguousMapping`] if the mapping is
    /// already registered to a different handler.
    pub fn register(&self, mapping: Mapping, handler: HandlerRef) -> Result<(), RegistryError> {
        self.register_inner(mapping, handler, None)
    }

    /// Register `mapping` for `handler` with a handler-level CORS policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AmbiguousMapping`] if the mapping is
    /// already registered to a different handler.
    pub fn register_with_cors(
        &self,
        mapping: Mapping,
        handler: HandlerRef,
        cors: CorsPolicy,
    ) -> Result<(), RegistryError> {
        self.register_inner(mapping, handler, Some(cors))
    }

    fn register_inner(
        &self,
        mapping: Mapping,
        handler: HandlerRef,
        cors: Option<CorsPolicy>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.write();
        if let Some(existing) = inner.registrations.get(&mapping) {
            if existing.handler != handler {
                return Err(RegistryError::AmbiguousMapping {
                    mapping: mapping.to_string(),
                    existing: existing.handler.clone(),
                    candidate: handler,
                });
            }
            // Same pair again: keep the registration as-is, only the CORS
            // policy may be refreshed.
            if let Some(cors) = cors {
                inner.cors_index.insert(handler, cors);
            }
            return Ok(());
        }

        let direct_urls = mapping.patterns().direct_urls();
        for url in &direct_urls {
            inner
                .url_index
                .entry(url.clone())
                .or_default()
                .push(mapping.clone());
        }
        if let Some(name) = mapping.name() {
            let handlers = inner.name_index.entry(name.to_string()).or_default();
            if !handlers.contains(&handler) {
                handlers.push(handler.clone());
            }
        }
        if let Some(cors) = cors {
            inner.cors_index.insert(handler.clone(), cors);
        }
        debug!(mapping = %mapping, handler = %handler, "registered mapping");
        inner.registrations.insert(
            mapping.clone(),
            MappingRegistration {
                mapping,
                handler,
                direct_urls,
            },
        );
        Ok(())
    }

    /// Remove a mapping and every index entry derived from it. Removing an
    /// unknown mapping is a no-op.
    pub fn unregister(&self, mapping: &Mapping) {
        let mut inner = self.write();
        let Some(registration) = inner.registrations.remove(mapping) else {
            return;
        };
        for url in &registration.direct_urls {
            if let Some(mappings) = inner.url_index.get_mut(url) {
                mappings.retain(|m| m != mapping);
                if mappings.is_empty() {
                    inner.url_index.remove(url);
                }
            }
        }
        if let Some(name) = registration.mapping.name() {
            let still_named = inner
                .registrations
                .values()
                .any(|r| r.mapping.name() == Some(name) && r.handler == registration.handler);
            if !still_named {
                if let Some(handlers) = inner.name_index.get_mut(name) {
                    handlers.retain(|h| h != &registration.handler);
                    if handlers.is_empty() {
                        inner.name_index.remove(name);
                    }
                }
            }
        }
        let handler_remains = inner
            .registrations
            .values()
            .any(|r| r.handler == registration.handler);
        if !handler_remains {
            inner.cors_index.remove(&registration.handler);
        }
        debug!(mapping = %registration.mapping, handler = %registration.handler, "unregistered mapping");
    }

    /// Snapshot of every registration.
    #[must_use]
    pub fn registrations(&self) -> Vec<MappingRegistration> {
        self.read().registrations.values().cloned().collect()
    }

    /// Handlers registered under a mapping name.
    #[must_use]
    pub fn handlers_by_name(&self, name: &str) -> Vec<HandlerRef> {
        self.read()
            .name_index
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// The CORS policy registered for a handler, if any.
    #[must_use]
    pub fn cors_policy(&self, handler: &HandlerRef) -> Option<CorsPolicy> {
        self.read().cors_index.get(handler).cloned()
    }

    /// Number of registered mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().registrations.len()
    }

    /// Whether the registry holds no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().registrations.is_empty()
    }

    // A poisoned lock means a panic elsewhere mid-write; the indices are
    // still structurally sound, so keep serving.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Indices> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Indices> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
