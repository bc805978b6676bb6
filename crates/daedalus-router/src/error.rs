//! Template compilation errors.

use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Templates are absolute paths.
    #[error("path template must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// A `{` without a closing `}`.
    #[error("unterminated placeholder in path template: {0}")]
    Unterminated(String),

    /// A `{}` placeholder.
    #[error("empty placeholder in path template: {0}")]
    EmptyPlaceholder(String),

    /// The same placeholder name appears twice.
    #[error("duplicate path parameter '{name}' in template: {template}")]
    DuplicateParam {
        /// The offending template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// The generated pattern failed to compile.
    #[error("invalid path template {template}: {reason}")]
    Pattern {
        /// The offending template.
        template: String,
        /// Regex compiler message.
        reason: String,
    },
}
