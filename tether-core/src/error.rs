//! Error types for the binding engine.

use thiserror::Error;

/// Errors raised while building or mutating a live template.
#[derive(Debug, Error)]
pub enum Error {
    /// A write traversed through something that is not an object or array.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A two-way binding or direct write targeted an expression that cannot
    /// be inverted (a template with literals or several interpolations).
    #[error("expression `{expression}` is not bindable")]
    NotBindable { expression: String },

    /// A binding expression could not be parsed.
    #[error("malformed expression `{expression}`: {reason}")]
    MalformedExpression { expression: String, reason: String },

    /// An `m-*` attribute the compiler does not know how to handle.
    #[error("unsupported directive `{directive}`")]
    UnsupportedDirective { directive: String },

    /// A collection operation applied to the wrong kind of collection.
    #[error("cannot {operation} on {kind}")]
    UnsupportedOperation { operation: &'static str, kind: &'static str },

    /// A value that had to be an object or array was not.
    #[error("expected an object or array, found {found}")]
    NotACollection { found: String },

    /// The template markup could not be parsed.
    #[error("markup error at byte {position}: {message}")]
    Markup { position: usize, message: String },

    /// A custom element definition was rejected.
    #[error("custom element `{name}`: {reason}")]
    CustomElement { name: String, reason: String },

    /// An event handler reported a failure.
    #[error("handler `{handler}` failed: {reason}")]
    HandlerFailed { handler: String, reason: String },

    /// Renderer configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
