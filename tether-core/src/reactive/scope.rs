//! Evaluation scopes.
//!
//! A [`Scope`] is a chain of observable layers searched innermost first. The
//! root scope has a single layer. A list item's scope puts the item locals
//! (`$index`, `$key`, `$value`) first, then the item itself when it is an
//! object, then every layer of the enclosing scope.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::expr::{Path, Segment};

use super::{Observable, Value};

/// An observable evaluation context for expressions and bindings.
#[derive(Clone)]
pub struct Scope {
    layers: Rc<[Observable]>,
}

impl Scope {
    /// A scope over a single store.
    pub fn new(store: Observable) -> Self {
        Self {
            layers: Rc::from(vec![store]),
        }
    }

    /// A scope over plain JSON data (the top level must be an object).
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Observable::from_json(json).map(Self::new)
    }

    /// A child scope whose lookups try `locals`, then `item`, then `self`.
    pub fn child(&self, locals: Observable, item: Option<Observable>) -> Self {
        let mut layers = Vec::with_capacity(self.layers.len() + 2);
        layers.push(locals);
        layers.extend(item);
        layers.extend(self.layers.iter().cloned());
        Self {
            layers: Rc::from(layers),
        }
    }

    /// The innermost layer.
    pub fn store(&self) -> &Observable {
        &self.layers[0]
    }

    /// The outermost layer.
    pub fn root(&self) -> &Observable {
        &self.layers[self.layers.len() - 1]
    }

    pub fn layers(&self) -> &[Observable] {
        &self.layers
    }

    /// The first layer holding `key`. Not tracked.
    pub fn owner_of(&self, key: &str) -> Option<&Observable> {
        self.layers.iter().find(|layer| layer.contains_key(key))
    }

    /// Look a key up through the layers. Tracked.
    ///
    /// Each layer that does not hold the key records a read of it anyway, so
    /// the value appears if any layer later gains the key.
    pub fn get(&self, key: &str) -> Value {
        for layer in self.layers.iter() {
            if layer.contains_key(key) {
                return layer.get(key);
            }
            layer.get(key);
        }
        Value::Null
    }

    /// Write a key to the first layer holding it, else to the innermost layer.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.owner_of(key).unwrap_or_else(|| self.store()).set(key, value)
    }

    /// Read a path whose first segment is resolved through the layers.
    pub fn get_path(&self, path: &Path) -> Value {
        let (first, rest) = path.split_first();
        let mut current = self.get(first);
        for segment in rest {
            current = match &current {
                Value::Collection(store) => store.get_segment(segment),
                _ => return Value::Null,
            };
        }
        current
    }

    /// Write a path whose first segment is resolved through the layers.
    pub fn set_path(&self, path: &Path, value: impl Into<Value>) -> Result<()> {
        let (first, rest) = path.split_first();
        let owner = self.owner_of(first).unwrap_or_else(|| self.store());
        if rest.is_empty() {
            return owner.set(first, value);
        }

        match owner.get_untracked(first) {
            Value::Collection(store) => store.set_segments(rest, value.into(), &path.to_string()),
            other => Err(Error::invalid_path(
                path.to_string(),
                format!("`{first}` is {}, not an object or array", other.type_name()),
            )),
        }
    }

    /// Resolve a method reference to its receiver and callee. Not tracked.
    ///
    /// For a single identifier the receiver is the layer that holds it; for a
    /// longer path it is the collection holding the last segment.
    pub fn resolve_method(&self, path: &Path) -> Option<(Observable, Value)> {
        let (first, rest) = path.split_first();
        let owner = self.owner_of(first)?.clone();
        let Some((last, middle)) = rest.split_last() else {
            let callee = owner.get_untracked(first);
            return Some((owner, callee));
        };

        let mut receiver = owner.get_untracked(first);
        for segment in middle {
            receiver = match &receiver {
                Value::Collection(store) => untracked_segment(store, segment),
                _ => return None,
            };
        }
        let receiver = receiver.as_collection()?.clone();
        let callee = untracked_segment(&receiver, last);
        Some((receiver, callee))
    }
}

fn untracked_segment(store: &Observable, segment: &Segment) -> Value {
    crate::reactive::ReactiveContext::untracked(|| store.get_segment(segment))
}

impl From<Observable> for Scope {
    fn from(store: Observable) -> Self {
        Self::new(store)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("layers", &self.layers.iter().map(Observable::id).collect::<Vec<_>>())
            .finish()
    }
}
