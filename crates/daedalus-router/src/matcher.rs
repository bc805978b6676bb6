//! Method + path matcher.
//!
//! This module provides [`RouteMatcher`], which owns the compiled templates of
//! a route table and selects the single best match for a request.

use http::Method;
use tracing::debug;

use crate::error::TemplateError;
use crate::template::{MatchMode, PathTemplate};
use crate::RouteMatch;

#[derive(Debug, Clone)]
struct Entry {
    method: Method,
    template: PathTemplate,
    index: usize,
}

/// Selects routes by method and path template.
///
/// Candidates are filtered by method and tested in descending order of raw
/// template length; the first structural match wins. Templates of equal
/// length keep their registration order, so the winner for any concrete path
/// is deterministic and independent of how the table was assembled apart
/// from that tie-break.
///
/// Length is a coarse stand-in for specificity: `/pets/{id}` (10 bytes) beats
/// `/pets/mine` (10 bytes) only by registration order, and a long template
/// with placeholders beats a shorter fully static one.
///
/// # Example
///
/// ```rust
/// use daedalus_router::RouteMatcher;
/// use http::Method;
///
/// let mut matcher = RouteMatcher::new();
/// matcher.insert(Method::GET, "/pets").unwrap();
/// matcher.insert(Method::GET, "/pets/{id}").unwrap();
///
/// let m = matcher.match_route(&Method::GET, "/pets/7").unwrap();
/// assert_eq!(m.index, 1);
/// assert_eq!(m.params.get("id"), Some("7"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    /// Kept sorted by descending template length, stable on ties.
    entries: Vec<Entry>,
    mode: MatchMode,
    next_index: usize,
}

impl RouteMatcher {
    /// Creates an empty matcher using prefix semantics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty matcher with the given mode.
    #[must_use]
    pub fn with_mode(mode: MatchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Returns the match mode.
    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Registers a template and returns its registration index.
    ///
    /// The index is what [`RouteMatch::index`] reports, so callers can keep
    /// their own route data in a parallel `Vec`.
    pub fn insert(&mut self, method: Method, template: &str) -> Result<usize, TemplateError> {
        let template = PathTemplate::parse(template, self.mode)?;
        let index = self.next_index;
        self.next_index += 1;

        let len = template.specificity();
        let position = self
            .entries
            .partition_point(|e| e.template.specificity() >= len);
        self.entries.insert(
            position,
            Entry {
                method,
                template,
                index,
            },
        );
        Ok(index)
    }

    /// Finds the best route for a method and path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let found = self
            .entries
            .iter()
            .filter(|e| e.method == *method)
            .find_map(|e| e.template.captures(path).map(|params| (e, params)));

        match found {
            Some((entry, params)) => {
                debug!(
                    method = %method,
                    path,
                    template = entry.template.as_str(),
                    "route matched"
                );
                Some(RouteMatch::new(entry.index, entry.template.as_str(), params))
            }
            None => {
                debug!(method = %method, path, "no route matched");
                None
            }
        }
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
