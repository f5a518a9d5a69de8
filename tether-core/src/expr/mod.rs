//! Binding Expressions
//!
//! An expression is either a bare property path (`greeting`, `items[0].name`)
//! or a template interleaving literal text with interpolated paths
//! (`"{{id}}-{{otherThing}}"`). Paths are also how `m-on` names its handler
//! method.
//!
//! Only bare paths can be written back (two-way binding). A template made of
//! exactly one interpolation and nothing else is normalized to its path.

mod path;

use std::fmt;
use std::rc::Rc;

pub use path::{Path, Segment};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::reactive::{Scope, Value};

/// One piece of a template expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Literal(String),
    Path(Path),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// A single property path. Evaluates to the raw value.
    Path(Path),
    /// Literal text and paths. Evaluates to their concatenated text.
    Template(Vec<Part>),
}

/// A parsed binding expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: Rc<str>,
    kind: ExpressionKind,
}

impl Expression {
    /// Parse a directive value: a bare path, optionally wrapped in one
    /// interpolation (`m-if="shown"` and `m-if="{{shown}}"` are equivalent).
    pub fn parse_directive(source: &str, config: &RenderConfig) -> Result<Self> {
        let trimmed = source.trim();
        let inner = trimmed
            .strip_prefix(config.open_delimiter.as_str())
            .and_then(|rest| rest.strip_suffix(config.close_delimiter.as_str()))
            .filter(|inner| !inner.contains(config.open_delimiter.as_str()))
            .unwrap_or(trimmed);

        let path = Path::parse(inner).map_err(|_| {
            Error::malformed(source, "directive values must be a property path")
        })?;
        Ok(Self {
            source: source.into(),
            kind: ExpressionKind::Path(path),
        })
    }

    /// Parse text or an attribute value containing interpolations.
    ///
    /// Returns `None` when there is nothing to interpolate.
    pub fn parse_template(source: &str, config: &RenderConfig) -> Result<Option<Self>> {
        let open = config.open_delimiter.as_str();
        let close = config.close_delimiter.as_str();

        let mut parts = Vec::new();
        let mut rest = source;
        while let Some(start) = rest.find(open) {
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + open.len()..];
            let end = after_open
                .find(close)
                .ok_or_else(|| Error::malformed(source, "unterminated interpolation"))?;
            let path = Path::parse(&after_open[..end])?;
            parts.push(Part::Path(path));
            rest = &after_open[end + close.len()..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        if !parts.iter().any(|part| matches!(part, Part::Path(_))) {
            return Ok(None);
        }

        let kind = match parts.as_slice() {
            [Part::Path(path)] => ExpressionKind::Path(path.clone()),
            _ => ExpressionKind::Template(parts),
        };
        Ok(Some(Self {
            source: source.into(),
            kind,
        }))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    /// The path, if this expression is a bare path.
    pub fn as_path(&self) -> Option<&Path> {
        match &self.kind {
            ExpressionKind::Path(path) => Some(path),
            ExpressionKind::Template(_) => None,
        }
    }

    /// Whether [`write`](Self::write) can succeed.
    pub fn is_bindable(&self) -> bool {
        self.as_path().is_some()
    }

    /// Fail with [`Error::NotBindable`] unless this is a bare path.
    pub fn require_path(&self) -> Result<&Path> {
        self.as_path().ok_or_else(|| Error::NotBindable {
            expression: self.source.to_string(),
        })
    }

    /// Evaluate against a scope. Every read is tracked.
    pub fn evaluate(&self, scope: &Scope) -> Value {
        match &self.kind {
            ExpressionKind::Path(path) => scope.get_path(path),
            ExpressionKind::Template(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        Part::Literal(literal) => text.push_str(literal),
                        Part::Path(path) => text.push_str(&scope.get_path(path).to_text()),
                    }
                }
                Value::from(text)
            }
        }
    }

    /// Write a value back through the expression's path.
    pub fn write(&self, scope: &Scope, value: impl Into<Value>) -> Result<()> {
        let path = self.require_path()?;
        scope.set_path(path, value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
