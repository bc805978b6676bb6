//! Typed configuration for Daedalus.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Layered loading (defaults → file → string → env)
//!
//! # Sections
//!
//! - [`ApiConfig`] - Title, version and base URL for the document
//! - [`DocsConfig`] - The reserved documentation path and security schemes
//! - [`RoutingConfig`] - Prefix or strict path matching
//! - [`ResponseConfig`] - Headers added to every response
//! - [`LoggingConfig`] - Log level and format
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! title = "Example pet API"
//! version = "1.0.0"
//! base_url = "https://pets.example.com"
//!
//! [docs]
//! enabled = true
//! path = "/swagger.json"
//!
//! [docs.security.api_key]
//! header = "x-api-key"
//!
//! [routing]
//! match_mode = "prefix"
//!
//! [response.default_headers]
//! "access-control-allow-origin" = "*"
//! "access-control-allow-credentials" = "true"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables, for
//! example `DAEDALUS__DOCS__PATH=/openapi.json`. The deployment variable
//! `BASEURL` fills `api.base_url` when nothing else sets it.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{DaedalusConfig, DaedalusConfigBuilder};
pub use daedalus_telemetry::LogFormat;
pub use error::ConfigError;
pub use loader::{ConfigLoader, BASE_URL_VAR};
pub use schema::{
    ApiConfig, ApiKeySchemeConfig, BearerSchemeConfig, DocsConfig, LoggingConfig,
    MatchModeSetting, ResponseConfig, RoutingConfig, SecurityConfig,
};
