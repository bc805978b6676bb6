//! Error types for Daedalus.
//!
//! [`ApiError`] is the single error type that crosses the handler boundary.
//! Every variant maps to an [`ErrorCategory`] and from there to an HTTP
//! status, and renders to the same wire envelope:
//!
//! ```json
//! { "statusCode": 404, "error": "Not Found", "message": "Pet id:7 not found" }
//! ```
//!
//! Internal failures never leak their message; the envelope carries a fixed
//! generic text and the source stays available for logging.

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Message sent to clients in place of any internal error detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No route accepts the method and path.
    RouteNotFound,
    /// Request validation errors (schema mismatch).
    Validation,
    /// A handler-raised error carrying its own status.
    Http,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Validation | Self::Http => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Daedalus.
///
/// Handlers return `Result<_, ApiError>`. Use the constructors for errors
/// that should reach the client with a specific status, and `?` on any
/// other failure: it converts through [`anyhow::Error`] into
/// [`ApiError::Internal`].
///
/// # Example
///
/// ```
/// use daedalus_core::ApiError;
/// use http::StatusCode;
///
/// fn find_pet(id: i64) -> Result<String, ApiError> {
///     if id != 1 {
///         return Err(ApiError::not_found(format!("Pet id:{id} not found")));
///     }
///     Ok("Garfield".to_string())
/// }
///
/// let err = find_pet(7).unwrap_err();
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// No route matched the request.
    #[error("Route not found: {method} {path}")]
    RouteNotFound {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Aggregated, human-readable message.
        message: String,
        /// Per-field messages.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// A handler error with an explicit status, surfaced verbatim.
    #[error("{message}")]
    Http {
        /// Status sent to the client.
        status: StatusCode,
        /// Message sent to the client.
        message: String,
        /// Optional structured data attached to the envelope.
        details: Option<serde_json::Value>,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Message for logs only.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a route-not-found error.
    #[must_use]
    pub fn route_not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::RouteNotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates an error with an explicit status.
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details to an [`ApiError::Http`]. Other variants
    /// are returned unchanged.
    #[must_use]
    pub fn with_details(self, value: serde_json::Value) -> Self {
        match self {
            Self::Http {
                status, message, ..
            } => Self::Http {
                status,
                message,
                details: Some(value),
            },
            other => other,
        }
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::http(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::http(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::http(StatusCode::CONFLICT, message)
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RouteNotFound { .. } => ErrorCategory::RouteNotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Http { .. } => ErrorCategory::Http,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            _ => self.category().default_status_code(),
        }
    }

    /// Returns `true` for errors whose detail must stay server-side.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Message sent to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::RouteNotFound { .. } => "Route not found".to_string(),
            Self::Validation { message, .. } | Self::Http { message, .. } => message.clone(),
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let status = self.status_code();
        ErrorEnvelope {
            status_code: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.client_message(),
            details: self.error_details(),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                field_errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            Self::Http { details, .. } => details.clone(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("JSON serialization failed", err)
    }
}

/// Field-specific validation errors, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// All messages joined into one line, field order preserved.
    #[must_use]
    pub fn summary(&self) -> String {
        self.fields
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(". ")
    }

    /// Moves every entry of `other` into `self`.
    pub fn extend(&mut self, other: Self) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }
}

/// Serializable error body for HTTP responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Numeric HTTP status.
    pub status_code: u16,
    /// Canonical reason phrase for the status.
    pub error: String,
    /// Client-facing message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found() {
        let error = ApiError::route_not_found("GET", "/nope");
        assert_eq!(error.category(), ErrorCategory::RouteNotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);

        let envelope = error.to_envelope();
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.error, "Not Found");
        assert_eq!(envelope.message, "Route not found");
    }

    #[test]
    fn test_validation_error_with_fields() {
        let mut field_errors = FieldErrors::new();
        field_errors.add("payload.name", "\"name\" is required");
        field_errors.add("headers.x-api-key", "\"ApiKey\" is required");

        let error = ApiError::validation_with_fields(field_errors.summary(), field_errors);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let envelope = error.to_envelope();
        assert_eq!(
            envelope.message,
            "\"name\" is required. \"ApiKey\" is required"
        );
        let details = envelope.details.unwrap();
        assert_eq!(details["fields"]["payload.name"][0], "\"name\" is required");
    }

    #[test]
    fn test_http_error_is_verbatim() {
        let error = ApiError::not_found("Pet id:7 not found");
        assert_eq!(error.category(), ErrorCategory::Http);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Pet id:7 not found");

        let envelope = error.to_envelope();
        assert_eq!(envelope.message, "Pet id:7 not found");
        assert!(envelope.details.is_none());
    }

    #[test]
    fn test_http_error_details() {
        let error = ApiError::conflict("name taken").with_details(serde_json::json!({"name": "Rex"}));
        let envelope = error.to_envelope();
        assert_eq!(envelope.status_code, 409);
        assert_eq!(envelope.details.unwrap()["name"], "Rex");
    }

    #[test]
    fn test_internal_error_hides_message() {
        let error = ApiError::from(anyhow::anyhow!("connection refused: db:5432"));
        assert!(error.is_internal());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope = error.to_envelope();
        assert_eq!(envelope.message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(envelope.error, "Internal Server Error");
        assert!(!serde_json::to_string(&envelope).unwrap().contains("5432"));
    }

    #[test]
    fn test_question_mark_converts_to_internal() {
        fn store() -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
        fn fails() -> ApiResult<()> {
            store()?;
            Ok(())
        }
        assert!(fails().unwrap_err().is_internal());
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = ApiError::bad_request("bad").to_envelope();
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            json,
            r#"{"statusCode":400,"error":"Bad Request","message":"bad"}"#
        );
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("limit", "must be positive");
        errors.add("limit", "must be an integer");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.fields["limit"].len(), 2);

        let mut more = FieldErrors::new();
        more.add("offset", "must be >= 0");
        errors.extend(more);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::RouteNotFound,
            ErrorCategory::Validation,
            ErrorCategory::Http,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {category:?} should map to error status code, got {status}"
            );
        }
    }
}
