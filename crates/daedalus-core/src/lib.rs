//! # Daedalus Core
//!
//! Core types for the Daedalus request dispatcher.
//!
//! - [`Schema`] - Declarative, composable value descriptors
//! - [`RouteValidation`] - Per-location request schemas and the validator
//! - [`Route`] / [`RouteTable`] - Route declarations and the immutable table
//! - [`HandlerEvent`] / [`ResponseContext`] - What a handler reads and mutates
//! - [`RouteHandler`] - The handler contract
//! - [`ApiError`] - Error taxonomy and wire envelope

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod fixtures;
mod handler;
mod route;
mod schema;
mod validation;

pub use context::{HandlerEvent, RequestId, ResponseContext, REQUEST_ID_HEADER};
pub use error::{
    ApiError, ApiResult, ErrorCategory, ErrorEnvelope, FieldErrors, INTERNAL_ERROR_MESSAGE,
};
pub use handler::{handler_fn, BoxFuture, FnHandler, HandlerResult, RouteHandler};
pub use route::{
    ResponseDoc, Route, RouteTable, RouteTableBuilder, RouteTableError, Tag, SUPPORTED_METHODS,
};
pub use schema::{
    ArrayRules, NumberRules, ObjectRules, Pattern, Schema, SchemaKind, SchemaMeta, StringRules,
};
pub use validation::{Location, RouteValidation};

pub use daedalus_router::{MatchMode, Params};
