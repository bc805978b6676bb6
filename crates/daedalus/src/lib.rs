//! # Daedalus
//!
//! **Request dispatcher for function-as-a-service HTTP endpoints**
//!
//! Daedalus takes a gateway event, finds the declared route, validates and
//! coerces the request against the route's schemas, runs the handler, and
//! frames the result as a transport response. The same route declarations
//! project into an OpenAPI 3.0 document served from a reserved path.
//!
//! ## Quick Start
//!
//! ```rust
//! use daedalus::prelude::*;
//! use serde_json::json;
//!
//! fn get_pets<'a>(
//!     _event: HandlerEvent,
//!     _response: &'a mut ResponseContext,
//! ) -> BoxFuture<'a, HandlerResult> {
//!     Box::pin(async { Ok(json!({ "result": [] })) })
//! }
//!
//! let table = RouteTable::builder()
//!     .route(Route::get("/pets", handler_fn(get_pets)).operation_id("getPets"))
//!     .build()
//!     .unwrap();
//! let dispatcher = Dispatcher::new(table);
//!
//! let response = tokio_test::block_on(dispatcher.dispatch(ApiEvent::new("GET", "/pets")));
//! assert_eq!(response.body, r#"{"result":[]}"#);
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ApiEvent → Docs? → Match → Validate → Handler(&mut ResponseContext)
//!                                                  ↓
//! TransportResponse ← Default headers ← Serialize ←┘
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod event;

pub use dispatcher::{
    projector_from_config, BuildError, Dispatcher, DEFAULT_DOCS_PATH, DOCS_OPERATION,
};
pub use event::{ApiEvent, TransportResponse};

// Re-export the component crates
pub use daedalus_config as config;
pub use daedalus_core as core;
pub use daedalus_docs as docs;
pub use daedalus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use daedalus::prelude::*;
///
/// let validation = RouteValidation::new().path_param("id", Schema::integer().required());
/// # let _ = validation;
/// ```
pub mod prelude {
    pub use crate::{ApiEvent, Dispatcher, TransportResponse};

    pub use daedalus_core::{
        handler_fn, ApiError, ApiResult, BoxFuture, HandlerEvent, HandlerResult, MatchMode,
        ResponseContext, Route, RouteHandler, RouteTable, RouteValidation, Schema,
    };

    pub use daedalus_config::{ConfigLoader, DaedalusConfig};

    pub use daedalus_docs::SpecProjector;

    pub use http::{Method, StatusCode};
}
