//! Test client for in-memory dispatch.

use std::sync::Arc;

use daedalus::{ApiEvent, Dispatcher};
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// A test client that drives a [`Dispatcher`] without any transport.
///
/// # Example
///
/// ```
/// use daedalus::Dispatcher;
/// use daedalus_core::fixtures;
/// use daedalus_test::TestClient;
///
/// let client = TestClient::new(Dispatcher::new(fixtures::pet_table().unwrap()))
///     .with_default_header("x-api-key", "secret");
///
/// let response = tokio_test::block_on(client.get("/pets/1").send());
/// response.assert_status_code(200);
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
    /// Default headers to add to all requests.
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client owning `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::from_shared(Arc::new(dispatcher))
    }

    /// Creates a test client over a shared dispatcher.
    pub fn from_shared(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The dispatcher under test.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Creates a GET request builder.
    pub fn get(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request("GET", target)
    }

    /// Creates a POST request builder.
    pub fn post(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request("POST", target)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request("PUT", target)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request("PATCH", target)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, target: impl Into<String>) -> TestClientRequest<'_> {
        self.request("DELETE", target)
    }

    /// Creates a request builder with any method, including ones the
    /// dispatcher does not support.
    pub fn request(
        &self,
        method: impl Into<String>,
        target: impl Into<String>,
    ) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, target))
    }

    /// Dispatches a prepared event as-is.
    pub async fn invoke(&self, event: ApiEvent) -> TestResponse {
        TestResponse::new(self.dispatcher.dispatch(event).await)
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets a query string parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("valid request")
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let event = self.builder.build()?;
        Ok(self.client.invoke(event).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::fixtures;
    use http::StatusCode;
    use serde_json::json;

    fn client() -> TestClient {
        TestClient::new(Dispatcher::new(fixtures::pet_table().unwrap()))
            .with_default_header("x-api-key", "secret")
    }

    #[tokio::test]
    async fn test_get_through_dispatcher() {
        let response = client().get("/pets/3").send().await;

        response
            .assert_status(StatusCode::OK)
            .assert_json_field("pathParameters.id", &json!(3))
            .assert_json_field("headers.x-api-key", &json!("secret"));
    }

    #[tokio::test]
    async fn test_query_from_target() {
        let response = client().get("/pets?limit=2").query("offset", 4).send().await;

        response
            .assert_success()
            .assert_json_field("queryStringParameters.limit", &json!(2))
            .assert_json_field("queryStringParameters.offset", &json!(4));
    }

    #[tokio::test]
    async fn test_post_json() {
        let response = client()
            .post("/pets")
            .json(&json!({ "name": "Rex" }))
            .send()
            .await;

        response.assert_json_field("payload.name", &json!("Rex"));
    }

    #[tokio::test]
    async fn test_default_header_overridable() {
        let response = client().get("/pets").header("x-api-key", "other").send().await;
        response.assert_json_field("headers.x-api-key", &json!("other"));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let response = client().request("TRACE", "/pets").send().await;
        response.assert_error(StatusCode::NOT_FOUND, "Route not found");
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let result = client().get("pets").try_send().await;
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[tokio::test]
    async fn test_shared_dispatcher() {
        let shared = Arc::new(Dispatcher::new(fixtures::pet_table().unwrap()));
        let client = TestClient::from_shared(Arc::clone(&shared));

        let response = client.get("/swagger.json").send().await;
        response.assert_json_field("openapi", &json!("3.0.0"));
        assert_eq!(Arc::strong_count(&shared), 2);
    }
}
