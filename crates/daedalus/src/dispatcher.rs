//! Request dispatch.
//!
//! [`Dispatcher::dispatch`] takes one gateway event through the pipeline:
//!
//! 1. Requests under the documentation path get the projected document
//! 2. The route table selects a route, or the request ends with `404`
//! 3. The route's validation rules check and coerce the request
//! 4. The handler runs with a fresh [`ResponseContext`]
//! 5. The result is serialized and default headers are merged under the
//!    handler's own
//!
//! Every failure becomes an error envelope; nothing escapes as a panic or an
//! `Err` to the transport.

use std::time::Instant;

use daedalus_config::{ConfigError, DaedalusConfig, ResponseConfig};
use daedalus_core::{
    ApiError, HandlerEvent, ResponseContext, Route, RouteTable, RouteTableError,
};
use daedalus_docs::{DocsResult, OpenApi, SpecProjector};
use daedalus_telemetry::metrics::{self as telemetry_metrics, UNMATCHED_OPERATION};
use daedalus_telemetry::InFlightGuard;
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::Instrument;

use crate::event::{ApiEvent, TransportResponse};

/// Default documentation path.
pub const DEFAULT_DOCS_PATH: &str = "/swagger.json";

/// Operation label used in metrics for documentation requests.
pub const DOCS_OPERATION: &str = "openapi";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Fallback body if an error envelope cannot be serialized.
const FALLBACK_ERROR_BODY: &str =
    r#"{"statusCode":500,"error":"Internal Server Error","message":"An internal server error occurred"}"#;

/// Errors raised while assembling a [`Dispatcher`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The route table rejected a route.
    #[error(transparent)]
    RouteTable(#[from] RouteTableError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The reserved documentation path and the projector serving it.
#[derive(Debug, Clone)]
struct DocsEndpoint {
    path: String,
    projector: SpecProjector,
}

/// Routes gateway events to handlers.
///
/// The dispatcher owns an immutable [`RouteTable`] and can be shared across
/// tasks behind an `Arc`.
///
/// # Example
///
/// ```
/// use daedalus::{ApiEvent, Dispatcher};
/// use daedalus_core::fixtures;
///
/// let dispatcher = Dispatcher::new(fixtures::pet_table().unwrap());
///
/// let event = ApiEvent::new("GET", "/pets/1").header("x-api-key", "secret");
/// let response = tokio_test::block_on(dispatcher.dispatch(event));
///
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.header("access-control-allow-origin"), Some("*"));
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    docs: Option<DocsEndpoint>,
    default_headers: IndexMap<String, String>,
}

impl Dispatcher {
    /// Creates a dispatcher serving docs at [`DEFAULT_DOCS_PATH`] with the
    /// permissive CORS headers.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            docs: Some(DocsEndpoint {
                path: DEFAULT_DOCS_PATH.to_string(),
                projector: SpecProjector::new(),
            }),
            default_headers: lowercase_keys(ResponseConfig::default().default_headers),
        }
    }

    /// Builds the table and dispatcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] for an invalid configuration and
    /// [`BuildError::RouteTable`] when a route is rejected.
    pub fn from_config(
        routes: impl IntoIterator<Item = Route>,
        config: &DaedalusConfig,
    ) -> Result<Self, BuildError> {
        config.validate()?;

        let table = RouteTable::builder()
            .mode(config.routing.match_mode.into())
            .routes(routes)
            .build()?;

        let docs = config.docs.enabled.then(|| DocsEndpoint {
            path: config.docs.path.clone(),
            projector: projector_from_config(config),
        });

        Ok(Self {
            table,
            docs,
            default_headers: lowercase_keys(config.response.default_headers.clone()),
        })
    }

    /// Serves the document projected by `projector` under `path`.
    #[must_use]
    pub fn with_docs(mut self, path: impl Into<String>, projector: SpecProjector) -> Self {
        self.docs = Some(DocsEndpoint {
            path: path.into(),
            projector,
        });
        self
    }

    /// Stops serving the document. The docs path then routes like any other.
    #[must_use]
    pub fn without_docs(mut self) -> Self {
        self.docs = None;
        self
    }

    /// Adds or replaces a default response header.
    #[must_use]
    pub fn with_default_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.default_headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// The route table.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The documentation path, if docs are served.
    #[must_use]
    pub fn docs_path(&self) -> Option<&str> {
        self.docs.as_ref().map(|docs| docs.path.as_str())
    }

    /// Projects the OpenAPI document for the current routes.
    ///
    /// Uses a placeholder projector when docs are disabled.
    ///
    /// # Errors
    ///
    /// Returns the projector's error.
    pub fn openapi(&self) -> DocsResult<OpenApi> {
        self.projector().project(self.table.routes())
    }

    /// Projects the OpenAPI document as JSON.
    ///
    /// # Errors
    ///
    /// Returns the projector's error.
    pub fn openapi_json(&self) -> DocsResult<String> {
        self.projector().project_json(self.table.routes())
    }

    fn projector(&self) -> SpecProjector {
        self.docs
            .as_ref()
            .map_or_else(SpecProjector::new, |docs| docs.projector.clone())
    }

    /// Handles one event.
    ///
    /// Never fails: routing, validation and handler errors all become error
    /// envelopes with the matching status.
    pub async fn dispatch(&self, event: ApiEvent) -> TransportResponse {
        let _in_flight = InFlightGuard::new();
        let started = Instant::now();

        let span = tracing::info_span!(
            "dispatch",
            http.method = %event.http_method,
            http.path = %event.path,
            operation_id = tracing::field::Empty,
            request_id = tracing::field::Empty,
        );

        async move {
            let (operation, response) = self.route(event).await;

            let elapsed = started.elapsed();
            telemetry_metrics::record_dispatch(&operation, response.status_code, elapsed);
            tracing::info!(
                operation_id = %operation,
                http.status_code = response.status_code,
                duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );

            response
        }
        .instrument(span)
        .await
    }

    /// Runs the pipeline, returning the metrics label with the response.
    async fn route(&self, event: ApiEvent) -> (String, TransportResponse) {
        if let Some(docs) = &self.docs {
            if event.path.starts_with(&docs.path) {
                return (DOCS_OPERATION.to_string(), self.docs_response(docs));
            }
        }

        let ApiEvent {
            http_method,
            path,
            path_parameters,
            query_string_parameters,
            headers,
            body,
        } = event;

        let Ok(method) = Method::from_bytes(http_method.to_ascii_uppercase().as_bytes()) else {
            let err = ApiError::route_not_found(http_method, path);
            return (UNMATCHED_OPERATION.to_string(), self.error_response(&err));
        };

        let (route, params) = match self.table.find(&method, &path) {
            Ok(found) => found,
            Err(err) => {
                return (UNMATCHED_OPERATION.to_string(), self.error_response(&err));
            }
        };
        let operation = route.operation_id_str().to_string();
        tracing::Span::current().record("operation_id", operation.as_str());

        let mut handler_event = HandlerEvent::new(method, path);
        handler_event.headers = to_value_map(headers);
        handler_event.query_string_parameters = to_value_map(query_string_parameters);
        handler_event.path_parameters = to_value_map(path_parameters);
        for (name, value) in params {
            handler_event
                .path_parameters
                .insert(name, Value::String(value));
        }
        handler_event.operation_id = Some(operation.clone());
        let mut handler_event = handler_event.with_body(body).with_inbound_request_id();
        tracing::Span::current().record(
            "request_id",
            tracing::field::display(&handler_event.request_id),
        );

        if let Some(rules) = route.validation_rules() {
            if let Err(err) = rules.validate(&mut handler_event) {
                telemetry_metrics::record_validation_failure(&operation);
                return (operation, self.error_response(&err));
            }
        }

        let mut context = ResponseContext::new();
        let result = route.handler().call(handler_event, &mut context).await;

        let response = match result {
            Ok(value) => self.success_response(value, context),
            Err(err) => self.error_response(&err),
        };
        (operation, response)
    }

    fn docs_response(&self, docs: &DocsEndpoint) -> TransportResponse {
        match docs.projector.project_json(self.table.routes()) {
            Ok(body) => TransportResponse {
                status_code: StatusCode::OK.as_u16(),
                headers: self.json_headers(),
                body,
            },
            Err(e) => {
                let err = ApiError::internal_with_source("OpenAPI projection failed", e);
                self.error_response(&err)
            }
        }
    }

    fn success_response(&self, value: Value, context: ResponseContext) -> TransportResponse {
        let (status, handler_headers, raw) = context.into_parts();

        let body = match value {
            Value::String(text) if raw => text,
            other => other.to_string(),
        };

        let mut headers = self.default_headers.clone();
        headers.extend(handler_headers);

        TransportResponse {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    fn error_response(&self, err: &ApiError) -> TransportResponse {
        log_error(err);

        let envelope = err.to_envelope();
        let body = serde_json::to_string(&envelope)
            .unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string());

        TransportResponse {
            status_code: envelope.status_code,
            headers: self.json_headers(),
            body,
        }
    }

    fn json_headers(&self) -> IndexMap<String, String> {
        let mut headers = self.default_headers.clone();
        headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());
        headers
    }
}

/// Builds the projector described by `config`.
#[must_use]
pub fn projector_from_config(config: &DaedalusConfig) -> SpecProjector {
    let mut projector = SpecProjector::new()
        .title(&config.api.title)
        .version(&config.api.version)
        .openapi_version(&config.docs.openapi_version);

    if let Some(description) = &config.api.description {
        projector = projector.description(description);
    }
    if let Some(base_url) = &config.api.base_url {
        projector = projector.base_url(base_url);
    }
    if let Some(api_key) = &config.docs.security.api_key {
        projector = projector.api_key_auth(&api_key.name, &api_key.header);
    }
    if let Some(bearer) = &config.docs.security.bearer {
        projector = projector.bearer_auth(&bearer.name, bearer.format.clone());
    }
    projector
}

fn log_error(err: &ApiError) {
    match err {
        ApiError::Internal { message, source } => {
            let cause = source
                .as_ref()
                .map(|source| format!("{source:#}"))
                .unwrap_or_default();
            tracing::error!(error = %message, cause = %cause, "request failed");
        }
        ApiError::RouteNotFound { .. } => tracing::debug!(error = %err, "no route"),
        _ => tracing::info!(
            error = %err,
            http.status_code = err.status_code().as_u16(),
            "request rejected"
        ),
    }
}

fn to_value_map(map: Option<IndexMap<String, String>>) -> Map<String, Value> {
    map.unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}

fn lowercase_keys(headers: IndexMap<String, String>) -> IndexMap<String, String> {
    headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::fixtures;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(fixtures::pet_table().unwrap())
    }

    #[test]
    fn test_default_headers_are_cors() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.default_headers.get("access-control-allow-origin").map(String::as_str),
            Some("*")
        );
        assert_eq!(
            dispatcher
                .default_headers
                .get("access-control-allow-credentials")
                .map(String::as_str),
            Some("true")
        );
        assert_eq!(dispatcher.docs_path(), Some(DEFAULT_DOCS_PATH));
    }

    #[test]
    fn test_with_default_header_lowercases() {
        let dispatcher = dispatcher().with_default_header("X-Powered-By", "daedalus");
        assert!(dispatcher.default_headers.contains_key("x-powered-by"));
    }

    #[test]
    fn test_without_docs() {
        let dispatcher = dispatcher().without_docs();
        assert_eq!(dispatcher.docs_path(), None);
        assert!(dispatcher.openapi_json().is_ok());
    }

    #[test]
    fn test_projector_from_config() {
        let mut config = DaedalusConfig::default();
        config.api.title = "Example pet API".to_string();
        config.api.base_url = Some("https://pets.example.com".to_string());
        config.docs.security.api_key = Some(daedalus_config::ApiKeySchemeConfig::default());

        let doc = projector_from_config(&config)
            .project(&fixtures::pet_routes())
            .unwrap();

        assert_eq!(doc.info.title, "Example pet API");
        assert_eq!(doc.servers[0].url, "https://pets.example.com");
        assert!(doc.components.security_schemes.contains_key("ApiKeyAuth"));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = DaedalusConfig::default();
        config.docs.path = "docs".to_string();

        let err = Dispatcher::from_config(fixtures::pet_routes(), &config).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn test_from_config_docs_disabled() {
        let mut config = DaedalusConfig::default();
        config.docs.enabled = false;

        let dispatcher = Dispatcher::from_config(fixtures::pet_routes(), &config).unwrap();
        assert_eq!(dispatcher.docs_path(), None);
        assert_eq!(dispatcher.table().len(), 4);
    }

    #[test]
    fn test_error_response_envelope() {
        let response = dispatcher().error_response(&ApiError::internal("db down"));
        let body = response.json_body().unwrap();

        assert_eq!(response.status_code, 500);
        assert_eq!(body["message"], daedalus_core::INTERNAL_ERROR_MESSAGE);
        assert_eq!(response.header("content-type"), Some(JSON_CONTENT_TYPE));
    }
}
