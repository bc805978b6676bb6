//! Route declarations and the immutable route table.

use std::fmt;
use std::sync::Arc;

use daedalus_router::{MatchMode, Params, RouteMatcher, TemplateError};
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;
use crate::handler::RouteHandler;
use crate::validation::RouteValidation;

/// Methods a route may be registered for.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// A documentation tag.
///
/// A bare name converts into a tag without description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl Tag {
    /// Creates a tag without description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<(&str, &str)> for Tag {
    fn from((name, description): (&str, &str)) -> Self {
        Self::new(name).with_description(description)
    }
}

/// Documentation for one expected response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDoc {
    /// Response description.
    pub description: String,
    /// OpenAPI `content` object, passed through as-is.
    pub content: Option<Value>,
}

/// A route: method, path template, handler and documentation.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{handler_fn, HandlerEvent, ResponseContext, Route, RouteValidation, Schema};
/// use serde_json::json;
///
/// let route = Route::get(
///     "/pets/{id}",
///     handler_fn(|event: HandlerEvent, _res: &mut ResponseContext| {
///         Box::pin(async move { Ok(json!({ "result": event.path_param("id") })) })
///     }),
/// )
/// .operation_id("getPetById")
/// .summary("Get a pet by its id")
/// .tag("pets")
/// .validation(RouteValidation::new().path_param("id", Schema::integer()));
///
/// assert_eq!(route.operation_id_str(), "getPetById");
/// assert_eq!(route.tags().len(), 1);
/// ```
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    operation_id: String,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<Tag>,
    validation: Option<RouteValidation>,
    responses: IndexMap<StatusCode, ResponseDoc>,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    /// Creates a route.
    ///
    /// The operation id defaults to the handler's identity in lower camel
    /// case, or to one generated from method and path.
    pub fn new(method: Method, path: impl Into<String>, handler: impl RouteHandler) -> Self {
        let path = path.into();
        let operation_id = handler
            .identity()
            .map(|name| lower_camel(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| generated_operation_id(&method, &path));
        Self {
            method,
            path,
            operation_id,
            summary: None,
            description: None,
            tags: Vec::new(),
            validation: None,
            responses: IndexMap::new(),
            handler: Arc::new(handler),
        }
    }

    /// `GET` route.
    pub fn get(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::new(Method::GET, path, handler)
    }

    /// `POST` route.
    pub fn post(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::new(Method::POST, path, handler)
    }

    /// `PUT` route.
    pub fn put(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    /// `PATCH` route.
    pub fn patch(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::new(Method::PATCH, path, handler)
    }

    /// `DELETE` route.
    pub fn delete(path: impl Into<String>, handler: impl RouteHandler) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    /// Sets the operation id.
    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = id.into();
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the request schemas.
    #[must_use]
    pub fn validation(mut self, validation: RouteValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Documents an expected response.
    #[must_use]
    pub fn response(mut self, status: StatusCode, description: impl Into<String>) -> Self {
        self.responses.insert(
            status,
            ResponseDoc {
                description: description.into(),
                content: None,
            },
        );
        self
    }

    /// Documents an expected response with an OpenAPI `content` object.
    #[must_use]
    pub fn response_with_content(
        mut self,
        status: StatusCode,
        description: impl Into<String>,
        content: Value,
    ) -> Self {
        self.responses.insert(
            status,
            ResponseDoc {
                description: description.into(),
                content: Some(content),
            },
        );
        self
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The raw path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The resolved operation id.
    #[must_use]
    pub fn operation_id_str(&self) -> &str {
        &self.operation_id
    }

    /// The summary.
    #[must_use]
    pub fn summary_str(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The description.
    #[must_use]
    pub fn description_str(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Request schemas, if declared.
    #[must_use]
    pub const fn validation_rules(&self) -> Option<&RouteValidation> {
        self.validation.as_ref()
    }

    /// Documented responses; empty means a single implied `200`.
    #[must_use]
    pub const fn responses(&self) -> &IndexMap<StatusCode, ResponseDoc> {
        &self.responses
    }

    /// The handler.
    #[must_use]
    pub fn handler(&self) -> &dyn RouteHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation_id", &self.operation_id)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// `get_pet_by_id` and `GetPetById` both become `getPetById`.
fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            upper_next = !out.is_empty();
        } else if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `GET /pets/{id}` becomes `getPetsId`.
fn generated_operation_id(method: &Method, path: &str) -> String {
    let mut id = method.as_str().to_ascii_lowercase();
    for word in path
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.extend(chars);
        }
    }
    id
}

/// Errors raised while assembling a [`RouteTable`].
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// The method is outside [`SUPPORTED_METHODS`].
    #[error("unsupported method {method} for route {path}")]
    UnsupportedMethod {
        /// Offending method.
        method: Method,
        /// Route path.
        path: String,
    },

    /// Two routes resolved to the same operation id.
    #[error("duplicate operationId '{0}'")]
    DuplicateOperationId(String),

    /// A path template failed to compile.
    #[error("invalid route {method} {path}")]
    Template {
        /// Route method.
        method: Method,
        /// Route path.
        path: String,
        /// Compilation error.
        #[source]
        source: TemplateError,
    },
}

/// The process-wide, read-only set of routes.
///
/// Built once at startup; lookups never mutate it, so it can be shared
/// across concurrent dispatches behind an `Arc` without locking.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{handler_fn, HandlerEvent, ResponseContext, Route, RouteTable};
/// use http::Method;
/// use serde_json::Value;
///
/// let noop = || handler_fn(|_e: HandlerEvent, _r: &mut ResponseContext| {
///     Box::pin(async { Ok(Value::Null) })
/// });
///
/// let table = RouteTable::builder()
///     .route(Route::get("/pets", noop()).operation_id("getPets"))
///     .route(Route::get("/pets/{id}", noop()).operation_id("getPetById"))
///     .build()
///     .unwrap();
///
/// let (route, params) = table.find(&Method::GET, "/pets/7").unwrap();
/// assert_eq!(route.operation_id_str(), "getPetById");
/// assert_eq!(params.get("id"), Some("7"));
/// ```
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    matcher: RouteMatcher,
}

impl RouteTable {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Iterates routes in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The matching mode.
    #[must_use]
    pub fn match_mode(&self) -> MatchMode {
        self.matcher.mode()
    }

    /// Selects the route for a method and path.
    ///
    /// # Errors
    ///
    /// [`ApiError::RouteNotFound`] when nothing matches.
    pub fn find(&self, method: &Method, path: &str) -> Result<(&Route, Params), ApiError> {
        self.matcher
            .match_route(method, path)
            .and_then(|m| self.routes.get(m.index).map(|route| (route, m.params)))
            .ok_or_else(|| ApiError::route_not_found(method.as_str(), path))
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Builder for [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    mode: MatchMode,
}

impl RouteTableBuilder {
    /// Sets the matching mode.
    #[must_use]
    pub const fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds several routes.
    #[must_use]
    pub fn routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Compiles every template and freezes the table.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported method, a malformed template or a repeated
    /// operation id.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut matcher = RouteMatcher::with_mode(self.mode);
        let mut seen = std::collections::HashSet::new();

        for route in &self.routes {
            if !SUPPORTED_METHODS.contains(&route.method) {
                return Err(RouteTableError::UnsupportedMethod {
                    method: route.method.clone(),
                    path: route.path.clone(),
                });
            }
            if !seen.insert(route.operation_id.as_str()) {
                return Err(RouteTableError::DuplicateOperationId(
                    route.operation_id.clone(),
                ));
            }
            matcher
                .insert(route.method.clone(), &route.path)
                .map_err(|source| RouteTableError::Template {
                    method: route.method.clone(),
                    path: route.path.clone(),
                    source,
                })?;
        }

        tracing::debug!(routes = self.routes.len(), mode = ?self.mode, "route table built");
        Ok(RouteTable {
            routes: self.routes,
            matcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{HandlerEvent, ResponseContext};
    use crate::handler::{handler_fn, BoxFuture, HandlerResult};

    fn noop<'a>(_event: HandlerEvent, _response: &'a mut ResponseContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(Value::Null) })
    }

    fn get_pets<'a>(_event: HandlerEvent, _response: &'a mut ResponseContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(Value::Null) })
    }

    #[test]
    fn test_operation_id_defaults_to_handler_identity() {
        let route = Route::get("/pets", handler_fn(get_pets));
        assert_eq!(route.operation_id_str(), "getPets");

        let route = Route::get("/pets", handler_fn(get_pets)).operation_id("listPets");
        assert_eq!(route.operation_id_str(), "listPets");
    }

    #[test]
    fn test_generated_operation_id() {
        assert_eq!(generated_operation_id(&Method::GET, "/pets/{id}"), "getPetsId");
        assert_eq!(
            generated_operation_id(&Method::DELETE, "/pet-owners/{ownerId}"),
            "deletePetOwnersOwnerId"
        );
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("get_pet_by_id"), "getPetById");
        assert_eq!(lower_camel("ListPets"), "listPets");
        assert_eq!(lower_camel("_private"), "private");
    }

    #[test]
    fn test_tags() {
        let route = Route::get("/pets", handler_fn(noop))
            .tag("pets")
            .tag(("pets", "Pet ops"))
            .tag(Tag::new("admin").with_description("Admin"));
        assert_eq!(route.tags().len(), 3);
        assert_eq!(route.tags()[1].description.as_deref(), Some("Pet ops"));
    }

    #[test]
    fn test_responses_are_kept_in_order() {
        let route = Route::post("/pets", handler_fn(noop))
            .response(StatusCode::CREATED, "Created")
            .response(StatusCode::BAD_REQUEST, "Invalid");
        let codes: Vec<_> = route.responses().keys().copied().collect();
        assert_eq!(codes, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    }

    #[test]
    fn test_table_find() {
        let table = RouteTable::builder()
            .route(Route::get("/pets", handler_fn(noop)).operation_id("a"))
            .route(Route::get("/pets/{id}", handler_fn(noop)).operation_id("b"))
            .route(Route::delete("/pets/{id}", handler_fn(noop)).operation_id("c"))
            .build()
            .unwrap();

        assert_eq!(table.len(), 3);
        let (route, params) = table.find(&Method::DELETE, "/pets/3").unwrap();
        assert_eq!(route.operation_id_str(), "c");
        assert_eq!(params.get("id"), Some("3"));

        let err = table.find(&Method::PUT, "/pets/3").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(table.find(&Method::GET, "/owners").is_err());
    }

    #[test]
    fn test_strict_table() {
        let table = RouteTable::builder()
            .mode(MatchMode::Strict)
            .route(Route::get("/pets", handler_fn(noop)).operation_id("a"))
            .build()
            .unwrap();
        assert_eq!(table.match_mode(), MatchMode::Strict);
        assert!(table.find(&Method::GET, "/pets/7").is_err());
    }

    #[test]
    fn test_duplicate_operation_id() {
        let err = RouteTable::builder()
            .route(Route::get("/a", handler_fn(noop)).operation_id("same"))
            .route(Route::get("/b", handler_fn(noop)).operation_id("same"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteTableError::DuplicateOperationId(id) if id == "same"));
    }

    #[test]
    fn test_invalid_template() {
        let err = RouteTable::builder()
            .route(Route::get("/pets/{id", handler_fn(noop)))
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteTableError::Template { .. }));
    }

    #[test]
    fn test_unsupported_method() {
        let err = RouteTable::builder()
            .route(Route::new(Method::TRACE, "/pets", handler_fn(noop)))
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteTableError::UnsupportedMethod { .. }));
    }
}
