//! Error types for the element model
//!
//! Simple, flat error hierarchy. Component failures are content-level
//! data, not control flow: the serializer turns them into inline error
//! nodes instead of propagating them.

use thiserror::Error;

use crate::types::ElementValue;

/// What a component invocation produces: a subtree, or a failure that the
/// serializer will contain at the failing node.
pub type ComponentResult = Result<ElementValue, ComponentError>;

/// Failure payload of a component invocation.
///
/// The message ends up in the substituted error node as
/// `Error: <message>`, visible in-band on the receiving side.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
