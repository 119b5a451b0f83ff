//! Opaque handler identity.
//!
//! A `HandlerRef` names a dispatch target without knowing anything about how
//! it executes. Resolving the reference to runnable code is the collaborator's
//! job; the engine only selects one.

use std::fmt;

/// Opaque identity of a dispatch target: the owning component plus an
/// operation identifier within it.
///
/// Two `HandlerRef`s are equal iff both fields are equal. The display label
/// is `component#operation`, e.g. `UserController#get_user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    component: String,
    operation: String,
}

impl HandlerRef {
    /// Create a handler reference from a component and operation name.
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
        }
    }

    /// The owning component.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// The operation identifier within the component.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The display label, `component#operation`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}#{}", self.component, self.operation)
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.component, self.operation)
    }
}
