//! Path template compilation.
//!
//! A template such as `/pets/{id}` is compiled into an anchored regular
//! expression. Every `{...}` placeholder becomes a capture group; the literal
//! text between placeholders is escaped.
//!
//! Two compilation modes exist (see [`MatchMode`]):
//!
//! - **Prefix**: a placeholder captures one or more characters of any kind
//!   (slashes included) and the pattern is anchored at the start of the path
//!   only. `/pets/{id}` therefore accepts `/pets/7`, `/pets/7/toys` and
//!   `/pets/7?x`. This is the compatibility behaviour of the gateways this
//!   crate replaces and is the default.
//! - **Strict**: a placeholder captures exactly one path segment and the
//!   pattern must consume the whole path.

use regex::Regex;

use crate::error::TemplateError;
use crate::params::Params;

/// How a compiled template is matched against a concrete path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Start-anchored match; placeholders may span segments.
    #[default]
    Prefix,
    /// Full-path match; placeholders capture a single segment.
    Strict,
}

/// A compiled path template.
///
/// # Example
///
/// ```rust
/// use daedalus_router::{MatchMode, PathTemplate};
///
/// let template = PathTemplate::parse("/pets/{id}", MatchMode::Prefix).unwrap();
/// let params = template.captures("/pets/7").unwrap();
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(template.param_names(), &["id".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    pattern: Regex,
    param_names: Vec<String>,
}

impl PathTemplate {
    /// Compiles a template string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template does not start with `/`,
    /// contains an empty or unterminated placeholder, or repeats a
    /// placeholder name.
    pub fn parse(template: &str, mode: MatchMode) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(template.to_string()));
        }

        let capture = match mode {
            MatchMode::Prefix => "(.+)",
            MatchMode::Strict => "([^/]+)",
        };

        let mut source = String::with_capacity(template.len() + 8);
        source.push('^');
        let mut param_names: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            source.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| TemplateError::Unterminated(template.to_string()))?;
            let name = after[..close].trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder(template.to_string()));
            }
            if param_names.iter().any(|n| n == name) {
                return Err(TemplateError::DuplicateParam {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            param_names.push(name.to_string());
            source.push_str(capture);
            rest = &after[close + 1..];
        }
        source.push_str(&regex::escape(rest));

        if mode == MatchMode::Strict {
            source.push('$');
        }

        let pattern = Regex::new(&source).map_err(|e| TemplateError::Pattern {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: template.to_string(),
            pattern,
            param_names,
        })
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Length of the raw template in bytes, the specificity measure.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.raw.len()
    }

    /// Placeholder names in template order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns `true` if the path is accepted by this template.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Matches the path and extracts placeholder values.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.pattern.captures(path)?;
        let mut params = Params::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.push(name.as_str(), value.as_str());
            }
        }
        Some(params)
    }
}
