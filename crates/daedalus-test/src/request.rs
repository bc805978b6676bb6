//! Test request building.

use daedalus::ApiEvent;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::TestError;

/// Builder for gateway events.
///
/// The target may carry a query string (`/pets?limit=5`); it is split off
/// and decoded into query string parameters.
///
/// # Example
///
/// ```
/// use daedalus_test::TestRequestBuilder;
///
/// let event = TestRequestBuilder::new("GET", "/pets?limit=5&name=Rex%20II")
///     .header("x-api-key", "secret")
///     .build()
///     .unwrap();
///
/// assert_eq!(event.path, "/pets");
/// let query = event.query_string_parameters.unwrap();
/// assert_eq!(query["limit"], "5");
/// assert_eq!(query["name"], "Rex II");
/// ```
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: String,
    target: String,
    headers: IndexMap<String, String>,
    query: IndexMap<String, String>,
    path_parameters: IndexMap<String, String>,
    body: Option<String>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            headers: IndexMap::new(),
            query: IndexMap::new(),
            path_parameters: IndexMap::new(),
            body: None,
            error: None,
        }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets a query string parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(name.into(), value.to_string());
        self
    }

    /// Sets a gateway-resolved path parameter.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("authorization", value)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the request body as JSON and the matching content type.
    ///
    /// A serialization failure is reported by [`build`](Self::build).
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                self.body = Some(body);
                self.header("content-type", "application/json")
            }
            Err(e) => {
                self.error = Some(TestError::Json(e));
                self
            }
        }
    }

    /// Builds the event.
    pub fn build(self) -> Result<ApiEvent, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.target.starts_with('/') {
            return Err(TestError::RequestBuild(format!(
                "path must start with '/': {}",
                self.target
            )));
        }

        let (path, query_string) = match self.target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query)),
            None => (self.target.clone(), None),
        };

        let mut query = query_string.map(parse_query).transpose()?.unwrap_or_default();
        query.extend(self.query);

        Ok(ApiEvent {
            http_method: self.method,
            path,
            path_parameters: non_empty(self.path_parameters),
            query_string_parameters: non_empty(query),
            headers: non_empty(self.headers),
            body: self.body,
        })
    }
}

fn parse_query(query: &str) -> Result<IndexMap<String, String>, TestError> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(name)?, decode(value)?))
        })
        .collect()
}

fn decode(text: &str) -> Result<String, TestError> {
    let text = text.replace('+', " ");
    urlencoding::decode(&text)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| TestError::RequestBuild(format!("invalid query encoding: {e}")))
}

/// The gateway sends `null` rather than an empty map.
fn non_empty(map: IndexMap<String, String>) -> Option<IndexMap<String, String>> {
    (!map.is_empty()).then_some(map)
}
