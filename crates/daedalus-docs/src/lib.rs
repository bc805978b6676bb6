//! # Daedalus Docs
//!
//! OpenAPI 3.0 projection of Daedalus route tables.
//!
//! The [`SpecProjector`] walks route declarations, translates their schema
//! descriptors, and emits a document whose components hold every parameter
//! schema, payload schema and request body by name.
//!
//! ## Quick Start
//!
//! ```rust
//! use daedalus_core::fixtures;
//! use daedalus_docs::SpecProjector;
//!
//! let table = fixtures::pet_table().unwrap();
//! let json = SpecProjector::new()
//!     .title("Example pet API")
//!     .version("1.0.0")
//!     .project_json(table.routes())
//!     .unwrap();
//!
//! assert!(json.starts_with(r#"{"openapi":"3.0.0""#));
//! ```
//!
//! ## Naming
//!
//! - Parameter schemas use the descriptor's label, else
//!   `{operationId}{Path|Query|Header}{Field}`
//! - Payload schemas and their request bodies use `{operationId}Payload`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod model;
mod projector;
mod registry;
mod translate;

pub use error::{DocsError, DocsResult};
pub use model::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RefOr,
    Reference, RequestBody, Response, Schema, SchemaType, SecurityRequirement, SecurityScheme,
    Server, Tag,
};
pub use projector::{SpecProjector, DEFAULT_OPENAPI_VERSION};
pub use registry::SchemaRegistry;
pub use translate::translate;
