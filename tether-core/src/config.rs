//! Renderer Configuration
//!
//! Controls the surface syntax of templates: which attribute prefix marks a
//! directive and which delimiters mark an interpolation. Defaults match the
//! conventional `m-if` / `{{expr}}` syntax.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Template syntax settings shared by the compiler and the expression parser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Attribute prefix for directives (`m-` gives `m-if`, `m-for`, ...).
    pub directive_prefix: String,

    /// Opening interpolation delimiter.
    pub open_delimiter: String,

    /// Closing interpolation delimiter.
    pub close_delimiter: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            directive_prefix: "m-".to_string(),
            open_delimiter: "{{".to_string(),
            close_delimiter: "}}".to_string(),
        }
    }
}

impl RenderConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can be used to parse templates.
    pub fn validate(&self) -> Result<()> {
        if self.directive_prefix.is_empty() {
            return Err(Error::Config("directive prefix must not be empty".into()));
        }
        if self.open_delimiter.is_empty() || self.close_delimiter.is_empty() {
            return Err(Error::Config("delimiters must not be empty".into()));
        }
        if self.open_delimiter == self.close_delimiter {
            return Err(Error::Config(format!(
                "open and close delimiters are both `{}`",
                self.open_delimiter
            )));
        }
        Ok(())
    }

    /// The directive name of an attribute, if it carries the directive prefix.
    pub(crate) fn directive<'a>(&self, attribute: &'a str) -> Option<&'a str> {
        attribute.strip_prefix(self.directive_prefix.as_str())
    }
}
