//! Per-route request validation.
//!
//! A route declares schemas per request [`Location`]. Only declared locations
//! are checked, and one aggregated [`ApiError::Validation`] is returned for
//! every failure found. Coerced values are written back into the event only
//! when the whole request passes. Header values stay text in their coerced
//! form (`"02"` becomes `"2"`); read them typed with
//! [`HandlerEvent::header_as`].
//!
//! Location policies:
//!
//! | location | unknown keys | presence |
//! |---|---|---|
//! | headers | tolerated, names matched case-insensitively | per schema |
//! | path parameters | tolerated | always required |
//! | query parameters | rejected once any are declared | per schema |
//! | payload | per object schema | per schema; unparsable bodies count as absent |

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::context::HandlerEvent;
use crate::error::{ApiError, FieldErrors};
use crate::schema::Schema;

/// Where in the request a schema applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Request headers.
    Headers,
    /// Placeholders captured from the path.
    PathParameters,
    /// Query string parameters.
    QueryStringParameters,
    /// Parsed JSON body.
    Payload,
}

impl Location {
    /// The request field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::PathParameters => "pathParameters",
            Self::QueryStringParameters => "queryStringParameters",
            Self::Payload => "payload",
        }
    }

    /// Segment used in generated document names, e.g. `getPetPathId`.
    #[must_use]
    pub const fn name_segment(&self) -> &'static str {
        match self {
            Self::Headers => "Header",
            Self::PathParameters => "Path",
            Self::QueryStringParameters => "Query",
            Self::Payload => "Payload",
        }
    }

    /// The OpenAPI `in` value for parameter locations.
    #[must_use]
    pub const fn parameter_in(&self) -> Option<&'static str> {
        match self {
            Self::Headers => Some("header"),
            Self::PathParameters => Some("path"),
            Self::QueryStringParameters => Some("query"),
            Self::Payload => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schemas a route declares for its request.
///
/// # Example
///
/// ```
/// use daedalus_core::{RouteValidation, Schema};
///
/// let validation = RouteValidation::new()
///     .header("x-api-key", Schema::string().required().label("ApiKey"))
///     .path_param("id", Schema::integer().label("PetId"));
///
/// assert!(validation.headers.is_some());
/// assert!(validation.payload.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteValidation {
    /// Header schemas by header name.
    pub headers: Option<IndexMap<String, Schema>>,
    /// Path parameter schemas by placeholder name.
    pub path_parameters: Option<IndexMap<String, Schema>>,
    /// Query parameter schemas by parameter name.
    pub query_string_parameters: Option<IndexMap<String, Schema>>,
    /// Payload schema.
    pub payload: Option<Schema>,
}

impl RouteValidation {
    /// Creates an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.headers
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema);
        self
    }

    /// Declares a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.path_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema);
        self
    }

    /// Declares a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.query_string_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema);
        self
    }

    /// Declares the payload.
    #[must_use]
    pub fn payload(mut self, schema: Schema) -> Self {
        self.payload = Some(schema);
        self
    }

    /// Parameter declarations for one location, if any.
    #[must_use]
    pub const fn parameters(&self, location: Location) -> Option<&IndexMap<String, Schema>> {
        match location {
            Location::Headers => self.headers.as_ref(),
            Location::PathParameters => self.path_parameters.as_ref(),
            Location::QueryStringParameters => self.query_string_parameters.as_ref(),
            Location::Payload => None,
        }
    }

    /// Checks `event` and, on success, replaces its fields with coerced
    /// values.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] with every failure found; `event` is left
    /// untouched.
    pub fn validate(&self, event: &mut HandlerEvent) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();

        let headers = self
            .headers
            .as_ref()
            .map(|schemas| check_headers(schemas, &event.headers, &mut errors));
        let path_parameters = self
            .path_parameters
            .as_ref()
            .map(|schemas| check_path(schemas, &event.path_parameters, &mut errors));
        let query = self
            .query_string_parameters
            .as_ref()
            .map(|schemas| check_query(schemas, &event.query_string_parameters, &mut errors));
        let payload = self.payload.as_ref().map(|schema| {
            schema.validate_at(
                event.payload.as_ref(),
                Location::Payload.as_str(),
                Location::Payload.as_str(),
                &mut errors,
            )
        });

        if !errors.is_empty() {
            let message = errors.summary();
            warn!(
                path = %event.path,
                fields = errors.len(),
                error = %message,
                "request validation failed"
            );
            return Err(ApiError::validation_with_fields(message, errors));
        }

        // Headers stay text; the coerced value is stored in its canonical form.
        for (name, value) in headers.into_iter().flatten() {
            event.headers.insert(name, Value::String(header_text(value)));
        }
        for (name, value) in path_parameters.into_iter().flatten() {
            event.path_parameters.insert(name, value);
        }
        for (name, value) in query.into_iter().flatten() {
            event.query_string_parameters.insert(name, value);
        }
        if let Some(Some(value)) = payload {
            event.payload = Some(value);
        }
        Ok(())
    }
}

type Coerced = Vec<(String, Value)>;

fn field_path(location: Location, name: &str) -> String {
    format!("{}.{name}", location.as_str())
}

fn check_headers(
    schemas: &IndexMap<String, Schema>,
    headers: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Coerced {
    schemas
        .iter()
        .filter_map(|(name, schema)| {
            // Keep the caller's spelling of the header name.
            let (key, value) = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map_or((name.as_str(), None), |(k, v)| (k.as_str(), Some(v)));
            let path = field_path(Location::Headers, name);
            schema
                .validate_at(value, &path, name, errors)
                .map(|v| (key.to_string(), v))
        })
        .collect()
}

fn header_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn check_path(
    schemas: &IndexMap<String, Schema>,
    params: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Coerced {
    schemas
        .iter()
        .filter_map(|(name, schema)| {
            let path = field_path(Location::PathParameters, name);
            let Some(value) = params.get(name) else {
                let label = schema.label_str().unwrap_or(name);
                errors.add(path, format!("\"{label}\" is required"));
                return None;
            };
            schema
                .validate_at(Some(value), &path, name, errors)
                .map(|v| (name.clone(), v))
        })
        .collect()
}

fn check_query(
    schemas: &IndexMap<String, Schema>,
    params: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Coerced {
    for key in params.keys().filter(|k| !schemas.contains_key(*k)) {
        errors.add(
            field_path(Location::QueryStringParameters, key),
            format!("\"{key}\" is not allowed"),
        );
    }

    schemas
        .iter()
        .filter_map(|(name, schema)| {
            let path = field_path(Location::QueryStringParameters, name);
            schema
                .validate_at(params.get(name), &path, name, errors)
                .map(|v| (name.clone(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use serde_json::json;

    fn pet_validation() -> RouteValidation {
        RouteValidation::new()
            .header("x-api-key", Schema::string().required().label("ApiKey"))
            .path_param("id", Schema::integer().label("PetId"))
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation {
                field_errors: Some(errors),
                ..
            } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_location_names() {
        assert_eq!(Location::Headers.as_str(), "headers");
        assert_eq!(Location::QueryStringParameters.to_string(), "queryStringParameters");
        assert_eq!(Location::PathParameters.name_segment(), "Path");
        assert_eq!(Location::Payload.parameter_in(), None);
    }

    #[test]
    fn test_valid_request_is_coerced() {
        let mut event = HandlerEvent::new(Method::GET, "/pets/7")
            .with_header("X-Api-Key", "secret")
            .with_header("user-agent", "curl")
            .with_path_param("id", "7");

        pet_validation().validate(&mut event).unwrap();
        assert_eq!(event.path_parameters["id"], json!(7));
        assert_eq!(event.header("x-api-key"), Some("secret"));
        assert_eq!(event.header("user-agent"), Some("curl"));
    }

    #[test]
    fn test_typed_headers_stay_readable() {
        let validation = RouteValidation::new()
            .header("x-version", Schema::integer())
            .header("x-dry-run", Schema::boolean());
        let mut event = HandlerEvent::new(Method::GET, "/pets")
            .with_header("x-version", "02")
            .with_header("X-Dry-Run", "TRUE");

        validation.validate(&mut event).unwrap();
        assert_eq!(event.header("x-version"), Some("2"));
        assert_eq!(event.header("x-dry-run"), Some("true"));
        assert_eq!(event.header_as::<i64>("x-version").unwrap(), Some(2));
        assert_eq!(event.header_as::<bool>("x-dry-run").unwrap(), Some(true));
    }

    #[test]
    fn test_invalid_path_param_is_rejected() {
        let mut event = HandlerEvent::new(Method::GET, "/pets/abc")
            .with_header("x-api-key", "secret")
            .with_path_param("id", "abc");
        let before = event.clone();

        let err = pet_validation().validate(&mut event).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "\"PetId\" must be a number");
        assert_eq!(event, before);
    }

    #[test]
    fn test_missing_path_param_is_required() {
        let validation = RouteValidation::new().path_param("id", Schema::integer());
        let mut event = HandlerEvent::new(Method::GET, "/pets");

        let errors = field_errors(validation.validate(&mut event).unwrap_err());
        assert_eq!(errors.fields["pathParameters.id"], vec!["\"id\" is required"]);
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut event = HandlerEvent::new(Method::GET, "/pets/abc").with_path_param("id", "abc");

        let errors = field_errors(pet_validation().validate(&mut event).unwrap_err());
        assert_eq!(errors.len(), 2);
        assert!(errors.fields.contains_key("headers.x-api-key"));
        assert!(errors.fields.contains_key("pathParameters.id"));
    }

    #[test]
    fn test_unknown_path_params_are_tolerated() {
        let validation = RouteValidation::new().path_param("id", Schema::integer());
        let mut event = HandlerEvent::new(Method::GET, "/pets/7")
            .with_path_param("id", "7")
            .with_path_param("proxy", "7/toys");
        assert!(validation.validate(&mut event).is_ok());
    }

    #[test]
    fn test_query_params() {
        let validation = RouteValidation::new()
            .query("limit", Schema::integer().positive())
            .query("offset", Schema::integer().min(0).default_value(0));

        let mut event = HandlerEvent::new(Method::GET, "/pets").with_query_param("limit", "25");
        validation.validate(&mut event).unwrap();
        assert_eq!(event.query_string_parameters["limit"], json!(25));
        assert_eq!(event.query_string_parameters["offset"], json!(0));

        let mut event = HandlerEvent::new(Method::GET, "/pets").with_query_param("sort", "name");
        let errors = field_errors(validation.validate(&mut event).unwrap_err());
        assert_eq!(
            errors.fields["queryStringParameters.sort"],
            vec!["\"sort\" is not allowed"]
        );
    }

    #[test]
    fn test_undeclared_query_accepts_anything() {
        let mut event = HandlerEvent::new(Method::GET, "/pets/7")
            .with_header("x-api-key", "k")
            .with_path_param("id", "7")
            .with_query_param("anything", "goes");
        assert!(pet_validation().validate(&mut event).is_ok());
    }

    #[test]
    fn test_payload() {
        let validation = RouteValidation::new().payload(
            Schema::object()
                .key("name", Schema::string().required())
                .label("CreatePetPayload"),
        );

        let mut event =
            HandlerEvent::new(Method::POST, "/pets").with_body(Some(r#"{"name":"Rex"}"#.into()));
        assert!(validation.validate(&mut event).is_ok());

        let mut event =
            HandlerEvent::new(Method::POST, "/pets").with_body(Some(r#"{"nom":"Rex"}"#.into()));
        let err = validation.validate(&mut event).unwrap_err();
        assert!(err.client_message().contains("\"name\" is required"));
    }

    #[test]
    fn test_unparsable_body_is_absent_payload() {
        let optional = RouteValidation::new().payload(Schema::object().unknown(true));
        let mut event = HandlerEvent::new(Method::POST, "/pets").with_body(Some("not json".into()));
        assert!(optional.validate(&mut event).is_ok());
        assert!(event.payload.is_none());

        let required = RouteValidation::new().payload(Schema::object().required());
        let mut event = HandlerEvent::new(Method::POST, "/pets").with_body(Some("not json".into()));
        let err = required.validate(&mut event).unwrap_err();
        assert_eq!(err.client_message(), "\"payload\" is required");
    }
}
