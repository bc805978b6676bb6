//! Handler contract.
//!
//! A handler receives the normalized [`HandlerEvent`] and a mutable
//! [`ResponseContext`], and returns a JSON value or an [`ApiError`]. The
//! response context is the only way a handler influences transport framing
//! (status and headers).
//!
//! # Example
//!
//! ```rust
//! use daedalus_core::{handler_fn, HandlerEvent, ResponseContext, RouteHandler};
//! use http::{Method, StatusCode};
//! use serde_json::json;
//!
//! let create = handler_fn(|event: HandlerEvent, response: &mut ResponseContext| {
//!     Box::pin(async move {
//!         response.set_status(StatusCode::CREATED);
//!         Ok(json!({ "result": event.payload }))
//!     })
//! });
//!
//! let mut response = ResponseContext::new();
//! let event = HandlerEvent::new(Method::POST, "/pets").with_body(Some("{}".into()));
//! let result = tokio_test::block_on(create.call(event, &mut response)).unwrap();
//!
//! assert_eq!(result, json!({ "result": {} }));
//! assert_eq!(response.status(), StatusCode::CREATED);
//! ```

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::context::{HandlerEvent, ResponseContext};
use crate::error::ApiError;

/// A boxed future borrowing for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler produces.
pub type HandlerResult = Result<Value, ApiError>;

/// A route handler.
///
/// The returned future may hold the `&mut ResponseContext` across await
/// points; the dispatcher reads the context only after the future resolves.
pub trait RouteHandler: Send + Sync + 'static {
    /// Handles one request.
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult>;

    /// Name used as the default operation id.
    ///
    /// Defaults to the implementing type's name.
    fn identity(&self) -> Option<String> {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Adapts a function to [`RouteHandler`].
///
/// Named functions report their own name as identity; closures report
/// none, so routes built from closures need an explicit operation id or
/// fall back to a generated one.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Wraps `func`.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("func", &std::any::type_name::<F>())
            .finish()
    }
}

impl<F> RouteHandler for FnHandler<F>
where
    F: for<'a> Fn(HandlerEvent, &'a mut ResponseContext) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        event: HandlerEvent,
        response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.func)(event, response)
    }

    fn identity(&self) -> Option<String> {
        let name = std::any::type_name::<F>();
        if name.contains("{{closure}}") {
            return None;
        }
        short_type_name(name)
    }
}

/// Wraps a function as a handler.
pub const fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: for<'a> Fn(HandlerEvent, &'a mut ResponseContext) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    FnHandler::new(func)
}

/// Last path segment of a type name, generics stripped.
fn short_type_name(full: &str) -> Option<String> {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::")
        .next()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use serde_json::json;

    struct ListPets;

    impl RouteHandler for ListPets {
        fn call<'a>(
            &'a self,
            _event: HandlerEvent,
            _response: &'a mut ResponseContext,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Ok(json!({ "result": [] })) })
        }
    }

    fn get_pet_by_id<'a>(
        event: HandlerEvent,
        response: &'a mut ResponseContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let id: i64 = event.path_param_as("id")?;
            if id != 1 {
                return Err(ApiError::not_found(format!("Pet id:{id} not found")));
            }
            response.set_header("x-pet", "1");
            Ok(json!({ "result": { "id": id } }))
        })
    }

    #[tokio::test]
    async fn test_struct_handler() {
        let mut response = ResponseContext::new();
        let result = ListPets
            .call(HandlerEvent::new(Method::GET, "/pets"), &mut response)
            .await
            .unwrap();
        assert_eq!(result, json!({ "result": [] }));
        assert_eq!(ListPets.identity().as_deref(), Some("ListPets"));
    }

    #[tokio::test]
    async fn test_fn_handler_mutates_response() {
        let handler = handler_fn(get_pet_by_id);
        let mut response = ResponseContext::new();
        let event = HandlerEvent::new(Method::GET, "/pets/1").with_path_param("id", "1");

        let result = handler.call(event, &mut response).await.unwrap();
        assert_eq!(result["result"]["id"], 1);
        assert_eq!(response.header("x-pet"), Some("1"));
        assert_eq!(handler.identity().as_deref(), Some("get_pet_by_id"));
    }

    #[tokio::test]
    async fn test_fn_handler_error() {
        let handler = handler_fn(get_pet_by_id);
        let mut response = ResponseContext::new();
        let event = HandlerEvent::new(Method::GET, "/pets/7").with_path_param("id", "7");

        let err = handler.call(event, &mut response).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "Pet id:7 not found");
    }

    #[test]
    fn test_closure_has_no_identity() {
        let handler = handler_fn(|_event: HandlerEvent, _response: &mut ResponseContext| {
            Box::pin(async { Ok(Value::Null) }) as BoxFuture<'_, HandlerResult>
        });
        assert_eq!(handler.identity(), None);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(
            short_type_name("pet_api::handlers::get_pets").as_deref(),
            Some("get_pets")
        );
        assert_eq!(
            short_type_name("a::Wrapper<b::Inner>").as_deref(),
            Some("Wrapper")
        );
    }
}
