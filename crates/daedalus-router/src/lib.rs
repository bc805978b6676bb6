//! Path template matcher for Daedalus.
//!
//! This crate turns route path templates (`/pets/{id}`) into anchored
//! patterns and picks, for a concrete method and path, the single route that
//! should handle it.
//!
//! # Selection rule
//!
//! 1. Keep only templates registered for the request method.
//! 2. Keep only templates whose pattern accepts the path.
//! 3. The longest raw template string wins; equal lengths fall back to
//!    registration order.
//!
//! # Example
//!
//! ```rust
//! use daedalus_router::RouteMatcher;
//! use http::Method;
//!
//! let mut matcher = RouteMatcher::new();
//! matcher.insert(Method::GET, "/pets").unwrap();
//! matcher.insert(Method::GET, "/pets/{id}").unwrap();
//! matcher.insert(Method::DELETE, "/pets/{id}").unwrap();
//!
//! let m = matcher.match_route(&Method::GET, "/pets/42").unwrap();
//! assert_eq!(m.template, "/pets/{id}");
//! assert_eq!(m.params.get("id"), Some("42"));
//!
//! assert!(matcher.match_route(&Method::PUT, "/pets/42").is_none());
//! ```
//!
//! # Prefix matching
//!
//! By default a template only has to match the *beginning* of the path, and
//! a placeholder may swallow slashes. `MatchMode::Strict` switches to
//! full-path, one-segment-per-placeholder matching.

mod error;
mod matcher;
mod params;
mod template;

pub use error::TemplateError;
pub use matcher::RouteMatcher;
pub use params::Params;
pub use template::{MatchMode, PathTemplate};

/// A matched route with its registration index and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// Registration index of the matched template.
    pub index: usize,
    /// The raw template that matched.
    pub template: &'a str,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(index: usize, template: &'a str, params: Params) -> Self {
        Self {
            index,
            template,
            params,
        }
    }
}
