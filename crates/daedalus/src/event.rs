//! Transport-facing event and response shapes.
//!
//! These mirror the API-gateway proxy integration: the adapter hands the
//! dispatcher an [`ApiEvent`] and returns the [`TransportResponse`] to the
//! platform as-is.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An inbound request as delivered by the gateway.
///
/// Absent maps may arrive as `null` or be omitted.
///
/// # Example
///
/// ```
/// use daedalus::ApiEvent;
///
/// let event: ApiEvent = serde_json::from_str(
///     r#"{"httpMethod":"GET","path":"/pets/1","headers":{"x-api-key":"secret"},"queryStringParameters":null}"#,
/// ).unwrap();
///
/// assert_eq!(event.http_method, "GET");
/// assert!(event.query_string_parameters.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// HTTP method, any case.
    pub http_method: String,
    /// Raw request path.
    pub path: String,
    /// Path parameters resolved by the gateway, if any.
    #[serde(default)]
    pub path_parameters: Option<IndexMap<String, String>>,
    /// Query string parameters.
    #[serde(default)]
    pub query_string_parameters: Option<IndexMap<String, String>>,
    /// Request headers.
    #[serde(default)]
    pub headers: Option<IndexMap<String, String>>,
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
}

impl ApiEvent {
    /// An event with no headers, parameters or body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds a query string parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the body to `value` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error for values that are not representable
    /// as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(value)?);
        Ok(self)
    }
}

/// What the dispatcher hands back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers, lower-case names.
    pub headers: IndexMap<String, String>,
    /// Serialized body.
    pub body: String,
}

impl TransportResponse {
    /// Looks up a header, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_builder() {
        let event = ApiEvent::new("POST", "/pets")
            .header("x-api-key", "secret")
            .query("dryRun", "true")
            .json(&json!({ "name": "Rex" }))
            .unwrap();

        assert_eq!(event.headers.unwrap()["x-api-key"], "secret");
        assert_eq!(event.query_string_parameters.unwrap()["dryRun"], "true");
        assert_eq!(event.body.as_deref(), Some(r#"{"name":"Rex"}"#));
    }

    #[test]
    fn test_event_deserializes_gateway_shape() {
        let event: ApiEvent = serde_json::from_value(json!({
            "httpMethod": "DELETE",
            "path": "/pets/3",
            "pathParameters": { "id": "3" },
            "headers": null,
            "body": null
        }))
        .unwrap();

        assert_eq!(event.http_method, "DELETE");
        assert_eq!(event.path_parameters.unwrap()["id"], "3");
        assert!(event.headers.is_none());
        assert!(event.body.is_none());
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let mut headers = IndexMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let response = TransportResponse {
            status_code: 201,
            headers,
            body: "{}".to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 201);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.json_body().unwrap(), json!({}));
    }
}
