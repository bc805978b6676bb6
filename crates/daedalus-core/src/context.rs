//! Request and response context types.
//!
//! A [`HandlerEvent`] is the normalized request a handler receives. A
//! [`ResponseContext`] is the mutable response framing a handler may adjust
//! before it returns.

use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use daedalus_core::RequestId;
///
/// let id = RequestId::new();
/// let parsed = RequestId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses an id from its hyphenated text form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The normalized request passed to a handler.
///
/// Parameter maps hold JSON values: raw strings as received, or coerced
/// values once the route's schemas have validated them. `payload` is the
/// best-effort JSON parse of `body`; an unparsable body leaves it `None`.
///
/// # Example
///
/// ```
/// use daedalus_core::HandlerEvent;
/// use http::Method;
///
/// let event = HandlerEvent::new(Method::POST, "/pets")
///     .with_header("X-Api-Key", "secret")
///     .with_body(Some(r#"{"name":"Rex"}"#.to_string()));
///
/// assert_eq!(event.header("x-api-key"), Some("secret"));
/// assert_eq!(event.payload.as_ref().unwrap()["name"], "Rex");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerEvent {
    /// Correlation id for this invocation.
    pub request_id: RequestId,
    /// Request method.
    pub method: Method,
    /// Raw request path.
    pub path: String,
    /// Path parameters.
    pub path_parameters: Map<String, Value>,
    /// Query string parameters.
    pub query_string_parameters: Map<String, Value>,
    /// Request headers, names as received.
    pub headers: Map<String, Value>,
    /// Raw request body.
    pub body: Option<String>,
    /// Parsed request body.
    pub payload: Option<Value>,
    /// Operation id of the matched route.
    pub operation_id: Option<String>,
}

impl HandlerEvent {
    /// Creates an event with no parameters, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            path_parameters: Map::new(),
            query_string_parameters: Map::new(),
            headers: Map::new(),
            body: None,
            payload: None,
            operation_id: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into(), Value::String(value.into()));
        self
    }

    /// Sets a path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters
            .insert(name.into(), Value::String(value.into()));
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .insert(name.into(), Value::String(value.into()));
        self
    }

    /// Sets the body and parses it as JSON when possible.
    #[must_use]
    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.payload = body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok());
        self.body = body;
        self
    }

    /// Uses the `x-request-id` header as the request id when it parses.
    #[must_use]
    pub fn with_inbound_request_id(mut self) -> Self {
        if let Some(id) = self.header(REQUEST_ID_HEADER).and_then(RequestId::parse) {
            self.request_id = id;
        }
        self
    }

    /// Looks up a header, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name).and_then(Value::as_str)
    }

    /// Reads a header as `T`, `None` when absent.
    ///
    /// # Errors
    ///
    /// 400 if the header does not parse as `T`.
    pub fn header_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        header_value(&self.headers, name)
            .map(|value| {
                convert(value)
                    .ok_or_else(|| ApiError::bad_request(format!("\"{name}\" is invalid")))
            })
            .transpose()
    }

    /// Returns a path parameter value.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&Value> {
        self.path_parameters.get(name)
    }

    /// Returns a query parameter value.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query_string_parameters.get(name)
    }

    /// Reads a path parameter as `T`.
    ///
    /// Text values that do not fit `T` directly are parsed as JSON, so `"7"`
    /// reads as `7_i64` even when the route declared no schema for it.
    ///
    /// # Errors
    ///
    /// 400 if the parameter is missing or has the wrong shape.
    pub fn path_param_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self
            .path_param(name)
            .ok_or_else(|| ApiError::bad_request(format!("\"{name}\" is required")))?;
        convert(value).ok_or_else(|| ApiError::bad_request(format!("\"{name}\" is invalid")))
    }

    /// Reads a query parameter as `T`, `None` when absent.
    ///
    /// # Errors
    ///
    /// 400 if the parameter has the wrong shape.
    pub fn query_param_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.query_param(name)
            .map(|value| {
                convert(value)
                    .ok_or_else(|| ApiError::bad_request(format!("\"{name}\" is invalid")))
            })
            .transpose()
    }

    /// Deserializes the payload.
    ///
    /// # Errors
    ///
    /// 400 if there is no payload or it does not fit `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let payload = self
            .payload
            .as_ref()
            .ok_or_else(|| ApiError::bad_request("\"payload\" is required"))?;
        T::deserialize(payload).map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

fn convert<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok().or_else(|| match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        _ => None,
    })
}

/// Case-insensitive lookup in a header map.
fn header_value<'a>(headers: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
}

/// Mutable response framing handed to a handler.
///
/// Starts as `200` with `content-type: application/json`. Whatever the
/// handler leaves here is applied to the transport response when it
/// returns successfully. Header names are stored lower-cased.
///
/// With `raw` set, a string result is written to the body verbatim instead
/// of being JSON-encoded.
///
/// # Example
///
/// ```
/// use daedalus_core::ResponseContext;
/// use http::StatusCode;
///
/// let mut response = ResponseContext::new();
/// response.set_status(StatusCode::CREATED);
/// response.set_header("Location", "/pets/7");
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.header("location"), Some("/pets/7"));
/// assert_eq!(response.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    status: StatusCode,
    headers: IndexMap<String, String>,
    raw: bool,
}

impl ResponseContext {
    /// Creates the initial response framing.
    #[must_use]
    pub fn new() -> Self {
        let mut headers = IndexMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status: StatusCode::OK,
            headers,
            raw: false,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Overrides the status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Removes a header.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(&name.to_ascii_lowercase())
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers in insertion order.
    #[must_use]
    pub const fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Writes string results verbatim.
    pub fn set_raw(&mut self, raw: bool) {
        self.raw = raw;
    }

    /// Whether string results are written verbatim.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// Splits into status, headers and the raw flag.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, IndexMap<String, String>, bool) {
        (self.status, self.headers, self.raw)
    }
}

impl Default for ResponseContext {
    fn default() -> Self {
        Self::new()
    }
}
