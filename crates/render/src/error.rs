//! Error types for the render engine
//!
//! Only defects reach the caller as errors: lookup failures and
//! pending-value resolution failures. Content-level render failures are
//! contained at the failing node and surface in-band as degraded output.

use thiserror::Error;

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Function call failed: {name}: {message}")]
    FunctionFailed { name: String, message: String },

    #[error("Render failed: {component}: {message}")]
    RenderFailed { component: String, message: String },

    #[error("Pending value not found: {0}")]
    PendingNotFound(String),

    #[error("Pending value abandoned before resolution: {0}")]
    PendingAbandoned(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
