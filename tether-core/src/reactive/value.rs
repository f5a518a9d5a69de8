//! Dynamic values held by observable stores.

use std::fmt;
use std::rc::Rc;

use crate::dom::Event;
use crate::error::Result;

use super::{Observable, Scope};

/// A method stored in a scope and invoked by `m-on` event bindings.
///
/// The callback receives the collection that owns the method (the receiver),
/// the dispatched event, and the scope the binding was evaluated in. Inside an
/// `m-for` item that scope is the item's child scope.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&Observable, &Event, &Scope) -> Result<()>>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Observable, &Event, &Scope) -> Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, receiver: &Observable, event: &Event, scope: &Scope) -> Result<()> {
        (self.0)(receiver, event, scope)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

/// A value stored under a key of an [`Observable`].
///
/// Objects and arrays are always observable: plain data converted with
/// [`Value::from_json`] is wrapped recursively.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    /// An observable object or array.
    Collection(Observable),
    Function(Function),
}

impl Value {
    /// Convert plain JSON data, wrapping every object and array.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.into()),
            serde_json::Value::Array(items) => {
                Value::Collection(Observable::array_from(items.into_iter().map(Value::from_json)))
            }
            serde_json::Value::Object(map) => Value::Collection(Observable::object_from(
                map.into_iter().map(|(k, v)| (k, Value::from_json(v))),
            )),
        }
    }

    /// Snapshot as plain JSON without tracking. Functions become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Collection(store) => store.to_json(),
        }
    }

    /// Truthiness as used by `m-if`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Collection(_) | Value::Function(_) => true,
        }
    }

    /// The string written into text nodes and attributes.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Collection(store) if store.is_array() => store
                .values()
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Collection(_) => "[object Object]".to_string(),
            Value::Function(_) => "function".to_string(),
        }
    }

    pub fn as_collection(&self) -> Option<&Observable> {
        match self {
            Value::Collection(store) => Some(store),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Collection(store) if store.is_array() => "array",
            Value::Collection(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

/// Host number formatting: integers without a fraction, exponent form at
/// and above `1e21` and below `1e-6`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.abs() >= 1e21 || (n != 0.0 && n.abs() < 1e-6) {
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        format!("{n}")
    }
}

/// Primitives compare by value; collections and functions by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Collection(store) => write!(f, "{store:?}"),
            Value::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Observable> for Value {
    fn from(store: Observable) -> Self {
        Value::Collection(store)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_coercion_follows_host_conventions() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from(3).to_text(), "3");
        assert_eq!(Value::from(2.5).to_text(), "2.5");
        assert_eq!(Value::Number(f64::NAN).to_text(), "NaN");
        assert_eq!(Value::from(false).to_text(), "false");
        assert_eq!(Value::from_json(json!([1, "a", null])).to_text(), "1,a,");
        assert_eq!(Value::from_json(json!({"a": 1})).to_text(), "[object Object]");
        assert_eq!(Value::from(1e20).to_text(), "100000000000000000000");
        assert_eq!(Value::from(1e21).to_text(), "1e+21");
        assert_eq!(Value::from(-1.5e22).to_text(), "-1.5e+22");
        assert_eq!(Value::from(2.5e-7).to_text(), "2.5e-7");
        assert_eq!(Value::from(0.000001).to_text(), "0.000001");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("no").is_truthy());
        assert!(Value::from_json(json!([])).is_truthy());
    }

    #[test]
    fn collections_compare_by_identity() {
        let a = Value::from_json(json!({"x": 1}));
        let b = Value::from_json(json!({"x": 1}));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::from("s"), Value::from("s".to_string()));
    }

    #[test]
    fn json_conversion_wraps_nested_data() {
        let value = Value::from_json(json!({"items": [{"name": "a"}]}));
        let items = value.as_collection().unwrap().get_untracked("items");
        let first = items.as_collection().unwrap().get_untracked("0");
        assert_eq!(first.as_collection().unwrap().get_untracked("name"), Value::from("a"));
        assert_eq!(value.to_json(), json!({"items": [{"name": "a"}]}));
    }
}
