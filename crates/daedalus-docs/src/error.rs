//! Error types for document projection.

use thiserror::Error;

/// Errors that can occur while projecting a route table.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two different schemas were registered under the same name.
    #[error("Schema '{name}' is registered twice with different definitions")]
    SchemaConflict {
        /// The contested component name.
        name: String,
    },

    /// A route cannot be expressed as an operation.
    #[error("Invalid operation '{operation_id}': {reason}")]
    InvalidOperation {
        /// The operation id of the route.
        operation_id: String,
        /// Why the route was rejected.
        reason: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
