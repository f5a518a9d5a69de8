//! Observable Store
//!
//! An [`Observable`] wraps an object (ordered key → value map) or an array and
//! tracks which bindings read which of its keys.
//!
//! # How Stores Work
//!
//! 1. When a key is read inside a reactive context (a binding evaluating its
//!    expression), the read is recorded as a [`Dependency`]. The binding then
//!    subscribes to exactly the keys it read.
//!
//! 2. When a key is written, every subscriber of that key is notified
//!    synchronously, in subscription order, before the write returns.
//!
//! 3. Structural changes (keys added or removed, array elements inserted,
//!    removed or replaced) also notify subscribers of the collection's
//!    [`Key::Shape`]. Reading the length or iterating tracks the shape.
//!
//! Writes always notify, even when the new value equals the old one.
//!
//! # Re-entrancy
//!
//! Subscriber lists are cloned before notification and every subscriber is
//! re-checked right before it is called, so callbacks may write to the store,
//! subscribe or unsubscribe without corrupting the iteration. A subscriber
//! removed mid-notification is skipped; one added mid-notification waits for
//! the next write.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{Error, Result};
use crate::expr::{Path, Segment};

use super::context::ReactiveContext;
use super::{Subscriber, SubscriberId, Value};

/// Counter for generating unique store IDs.
static STORE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_store_id() -> u64 {
    STORE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A trackable key of a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named property of an object.
    Prop(Rc<str>),
    /// A position in an array.
    Index(usize),
    /// The set of keys (object) or the length and element identities (array).
    Shape,
}

impl Key {
    pub fn prop(name: &str) -> Self {
        Key::Prop(name.into())
    }
}

/// One tracked read: a key of a specific store.
#[derive(Clone)]
pub struct Dependency {
    store: Observable,
    key: Key,
}

impl Dependency {
    pub fn new(store: &Observable, key: Key) -> Self {
        Self {
            store: store.clone(),
            key,
        }
    }

    pub fn store(&self) -> &Observable {
        &self.store
    }

    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store) && self.key == other.key
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("store", &self.store.id())
            .field("key", &self.key)
            .finish()
    }
}

enum Data {
    Object(IndexMap<Rc<str>, Value>),
    Array(Vec<Value>),
}

impl Data {
    fn kind(&self) -> &'static str {
        match self {
            Data::Object(_) => "object",
            Data::Array(_) => "array",
        }
    }
}

struct ObservableInner {
    id: u64,
    data: RefCell<Data>,
    dependents: RefCell<HashMap<Key, SmallVec<[Subscriber; 2]>>>,
}

/// An observable object or array.
///
/// Cloning gives another handle to the same store.
#[derive(Clone)]
pub struct Observable {
    inner: Rc<ObservableInner>,
}

impl Observable {
    fn with_data(data: Data) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                id: next_store_id(),
                data: RefCell::new(data),
                dependents: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Create an empty observable object.
    pub fn object() -> Self {
        Self::with_data(Data::Object(IndexMap::new()))
    }

    /// Create an empty observable array.
    pub fn array() -> Self {
        Self::with_data(Data::Array(Vec::new()))
    }

    /// Create an observable object from key/value pairs, in order.
    pub fn object_from<K, I>(entries: I) -> Self
    where
        K: Into<Rc<str>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::with_data(Data::Object(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Create an observable array from values.
    pub fn array_from<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::with_data(Data::Array(values.into_iter().collect()))
    }

    /// Wrap plain JSON data. The top level must be an object or array.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from_json(json) {
            Value::Collection(store) => Ok(store),
            other => Err(Error::NotACollection {
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Snapshot the store as plain JSON without tracking.
    pub fn to_json(&self) -> serde_json::Value {
        match &*self.inner.data.borrow() {
            Data::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect(),
            ),
            Data::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Get the store's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_array(&self) -> bool {
        matches!(&*self.inner.data.borrow(), Data::Array(_))
    }

    /// Whether two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Observable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn kind(&self) -> &'static str {
        self.inner.data.borrow().kind()
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Record a read of `key` if a binding is evaluating.
    pub fn track(&self, key: Key) {
        if ReactiveContext::is_active() {
            ReactiveContext::track_dependency(Dependency::new(self, key));
        }
    }

    /// Read a key by name. Array stores accept decimal indices and `length`.
    ///
    /// Tracked. Missing keys read as [`Value::Null`] and are still tracked, so
    /// creating them later notifies the reader.
    pub fn get(&self, key: &str) -> Value {
        match self.key_for(key) {
            Some(key) => self.read(key),
            None => Value::Null,
        }
    }

    /// Read an array element. On an object, reads the decimal key.
    pub fn get_index(&self, index: usize) -> Value {
        if self.is_array() {
            self.read(Key::Index(index))
        } else {
            self.get(&index.to_string())
        }
    }

    /// Read a key without recording a dependency.
    pub fn get_untracked(&self, key: &str) -> Value {
        ReactiveContext::untracked(|| self.get(key))
    }

    /// Whether the key currently exists. Not tracked.
    pub fn contains_key(&self, key: &str) -> bool {
        match &*self.inner.data.borrow() {
            Data::Object(map) => map.contains_key(key),
            Data::Array(items) => {
                key == "length" || key.parse::<usize>().is_ok_and(|i| i < items.len())
            }
        }
    }

    /// Number of keys or elements. Tracks the shape.
    pub fn len(&self) -> usize {
        self.track(Key::Shape);
        match &*self.inner.data.borrow() {
            Data::Object(map) => map.len(),
            Data::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in order (decimal indices for arrays). Tracks the shape.
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    /// Values in order. Tracks the shape.
    pub fn values(&self) -> Vec<Value> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    /// Key/value pairs in order (decimal indices for arrays). Tracks the shape.
    pub fn entries(&self) -> Vec<(Rc<str>, Value)> {
        self.track(Key::Shape);
        match &*self.inner.data.borrow() {
            Data::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Data::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Rc::from(i.to_string()), v.clone()))
                .collect(),
        }
    }

    /// Read one path segment from this store. Tracked.
    pub fn get_segment(&self, segment: &Segment) -> Value {
        match segment {
            Segment::Key(key) => self.get(key),
            Segment::Index(index) => self.get_index(*index),
        }
    }

    /// Read a nested path starting at this store. Tracked at every step.
    pub fn get_path(&self, path: &Path) -> Value {
        let mut current = Value::Collection(self.clone());
        for segment in path.segments() {
            current = match &current {
                Value::Collection(store) => store.get_segment(segment),
                _ => return Value::Null,
            };
        }
        current
    }

    fn key_for(&self, key: &str) -> Option<Key> {
        match &*self.inner.data.borrow() {
            Data::Object(_) => Some(Key::Prop(key.into())),
            Data::Array(_) if key == "length" => Some(Key::Shape),
            Data::Array(_) => key.parse::<usize>().ok().map(Key::Index),
        }
    }

    fn read(&self, key: Key) -> Value {
        let value = match (&*self.inner.data.borrow(), &key) {
            (Data::Object(map), Key::Prop(name)) => map.get(name).cloned().unwrap_or_default(),
            (Data::Array(items), Key::Index(i)) => items.get(*i).cloned().unwrap_or_default(),
            (Data::Array(items), Key::Shape) => Value::from(items.len()),
            _ => Value::Null,
        };
        self.track(key);
        value
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Write a key by name and notify its dependents.
    ///
    /// On an array the key must be a decimal index no greater than the length
    /// (writing at the length appends).
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if self.is_array() {
            let index = key.parse::<usize>().map_err(|_| {
                Error::invalid_path(key, "array keys must be decimal indices")
            })?;
            return self.set_index(index, value);
        }

        let key: Rc<str> = key.into();
        let previous = match &mut *self.inner.data.borrow_mut() {
            Data::Object(map) => map.insert(key.clone(), value),
            Data::Array(_) => None,
        };
        drop(previous);

        self.notify(&Key::Prop(key));
        self.notify(&Key::Shape);
        Ok(())
    }

    /// Write an array element. On an object, writes the decimal key.
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        if !self.is_array() {
            return self.set(&index.to_string(), value);
        }

        let value = value.into();
        let previous = match &mut *self.inner.data.borrow_mut() {
            Data::Array(items) if index < items.len() => std::mem::replace(&mut items[index], value),
            Data::Array(items) if index == items.len() => {
                items.push(value);
                Value::Null
            }
            Data::Array(items) => {
                return Err(Error::invalid_path(
                    index.to_string(),
                    format!("index past the end of an array of length {}", items.len()),
                ));
            }
            Data::Object(_) => Value::Null,
        };
        drop(previous);

        self.notify(&Key::Index(index));
        self.notify(&Key::Shape);
        Ok(())
    }

    /// Append to an array.
    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let index = match &mut *self.inner.data.borrow_mut() {
            Data::Array(items) => {
                items.push(value);
                items.len() - 1
            }
            Data::Object(_) => return Err(self.unsupported("push")),
        };
        self.notify(&Key::Index(index));
        self.notify(&Key::Shape);
        Ok(())
    }

    /// Remove and return the last array element.
    pub fn pop(&self) -> Result<Value> {
        let (value, index) = match &mut *self.inner.data.borrow_mut() {
            Data::Array(items) => (items.pop().unwrap_or_default(), items.len()),
            Data::Object(_) => return Err(self.unsupported("pop")),
        };
        self.notify(&Key::Index(index));
        self.notify(&Key::Shape);
        Ok(value)
    }

    /// Insert into an array at `index`, shifting later elements.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match &mut *self.inner.data.borrow_mut() {
            Data::Array(items) if index <= items.len() => items.insert(index, value),
            Data::Array(items) => {
                return Err(Error::invalid_path(
                    index.to_string(),
                    format!("index past the end of an array of length {}", items.len()),
                ));
            }
            Data::Object(_) => return Err(self.unsupported("insert")),
        }
        self.notify_from(index);
        self.notify(&Key::Shape);
        Ok(())
    }

    /// Remove an object key or array element, returning the old value.
    ///
    /// Removing a missing object key returns [`Value::Null`] and still
    /// notifies.
    pub fn remove(&self, key: &str) -> Result<Value> {
        if self.is_array() {
            let index = key.parse::<usize>().map_err(|_| {
                Error::invalid_path(key, "array keys must be decimal indices")
            })?;
            return self.remove_index(index);
        }

        let previous = match &mut *self.inner.data.borrow_mut() {
            Data::Object(map) => map.shift_remove(key).unwrap_or_default(),
            Data::Array(_) => Value::Null,
        };
        self.notify(&Key::prop(key));
        self.notify(&Key::Shape);
        Ok(previous)
    }

    /// Remove an array element, shifting later elements.
    pub fn remove_index(&self, index: usize) -> Result<Value> {
        let previous = match &mut *self.inner.data.borrow_mut() {
            Data::Array(items) if index < items.len() => items.remove(index),
            Data::Array(items) => {
                return Err(Error::invalid_path(
                    index.to_string(),
                    format!("no element in an array of length {}", items.len()),
                ));
            }
            Data::Object(_) => return Err(self.unsupported("remove_index")),
        };
        self.notify_from(index);
        self.notify(&Key::Shape);
        Ok(previous)
    }

    /// Remove every key or element.
    pub fn clear(&self) {
        let removed: Vec<Key> = match &mut *self.inner.data.borrow_mut() {
            Data::Object(map) => map.drain(..).map(|(k, _)| Key::Prop(k)).collect(),
            Data::Array(items) => {
                let len = items.len();
                items.clear();
                (0..len).map(Key::Index).collect()
            }
        };
        for key in &removed {
            self.notify(key);
        }
        self.notify(&Key::Shape);
    }

    /// Write one path segment into this store.
    pub fn set_segment(&self, segment: &Segment, value: Value) -> Result<()> {
        match segment {
            Segment::Key(key) => self.set(key, value),
            Segment::Index(index) => self.set_index(*index, value),
        }
    }

    /// Write a nested path starting at this store.
    ///
    /// Fails with [`Error::InvalidPath`] if any intermediate segment is not an
    /// object or array.
    pub fn set_path(&self, path: &Path, value: impl Into<Value>) -> Result<()> {
        self.set_segments(path.segments(), value.into(), &path.to_string())
    }

    pub(crate) fn set_segments(&self, segments: &[Segment], value: Value, path: &str) -> Result<()> {
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::invalid_path(path, "empty path"))?;

        let mut target = self.clone();
        for segment in parents {
            let next = ReactiveContext::untracked(|| target.get_segment(segment));
            target = match next {
                Value::Collection(store) => store,
                other => {
                    return Err(Error::invalid_path(
                        path,
                        format!("`{segment}` is {}, not an object or array", other.type_name()),
                    ));
                }
            };
        }
        target.set_segment(last, value)
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            operation,
            kind: self.kind(),
        }
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Register a subscriber for a key. Subscribing twice is a no-op.
    pub fn subscribe(&self, key: Key, subscriber: Subscriber) {
        let mut dependents = self.inner.dependents.borrow_mut();
        let list = dependents.entry(key).or_default();
        if !list.iter().any(|s| s.id() == subscriber.id()) {
            list.push(subscriber);
        }
    }

    /// Remove a subscriber from a key.
    pub fn unsubscribe(&self, key: &Key, subscriber_id: SubscriberId) {
        let mut dependents = self.inner.dependents.borrow_mut();
        if let Some(list) = dependents.get_mut(key) {
            list.retain(|s| s.id() != subscriber_id);
            if list.is_empty() {
                dependents.remove(key);
            }
        }
    }

    /// Number of subscribers on a key.
    pub fn dependent_count(&self, key: &Key) -> usize {
        self.inner
            .dependents
            .borrow()
            .get(key)
            .map_or(0, |list| list.len())
    }

    /// Number of subscribers across all keys.
    pub fn total_dependents(&self) -> usize {
        self.inner.dependents.borrow().values().map(|l| l.len()).sum()
    }

    fn is_subscribed(&self, key: &Key, subscriber_id: SubscriberId) -> bool {
        self.inner
            .dependents
            .borrow()
            .get(key)
            .is_some_and(|list| list.iter().any(|s| s.id() == subscriber_id))
    }

    /// Notify all subscribers of a key, in subscription order.
    fn notify(&self, key: &Key) {
        let snapshot: SmallVec<[Subscriber; 4]> = match self.inner.dependents.borrow().get(key) {
            Some(list) => list.iter().cloned().collect(),
            None => return,
        };

        trace!(store = self.id(), ?key, dependents = snapshot.len(), "notify");

        for subscriber in snapshot {
            if self.is_subscribed(key, subscriber.id()) {
                subscriber.notify();
            }
        }
    }

    /// Notify subscribers of every index at or after `from`, ascending.
    fn notify_from(&self, from: usize) {
        let mut indices: Vec<usize> = self
            .inner
            .dependents
            .borrow()
            .keys()
            .filter_map(|key| match key {
                Key::Index(i) if *i >= from => Some(*i),
                _ => None,
            })
            .collect();
        indices.sort_unstable();
        for index in indices {
            self.notify(&Key::Index(index));
        }
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.borrow();
        let len = match &*data {
            Data::Object(map) => map.len(),
            Data::Array(items) => items.len(),
        };
        f.debug_struct("Observable")
            .field("id", &self.inner.id)
            .field("kind", &data.kind())
            .field("len", &len)
            .field("dependents", &self.inner.dependents.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    fn counter(store: &Observable, key: Key) -> (Rc<Cell<usize>>, SubscriberId) {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let id = SubscriberId::new();
        store.subscribe(key, Subscriber::new(id, move || count_clone.set(count_clone.get() + 1)));
        (count, id)
    }

    #[test]
    fn get_and_set() {
        let store = Observable::object();
        assert_eq!(store.get("missing"), Value::Null);

        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting"), Value::from("hello"));
    }

    #[test]
    fn set_notifies_dependents_in_subscription_order() {
        let store = Observable::object();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = log.clone();
            store.subscribe(
                Key::prop("a"),
                Subscriber::new(SubscriberId::new(), move || log.borrow_mut().push(name)),
            );
        }

        store.set("a", 1).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn writes_always_notify() {
        let store = Observable::object();
        let (count, _) = counter(&store, Key::prop("a"));

        store.set("a", 1).unwrap();
        store.set("a", 1).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Observable::object();
        let (count, id) = counter(&store, Key::prop("a"));

        store.set("a", 1).unwrap();
        store.unsubscribe(&Key::prop("a"), id);
        store.set("a", 2).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(store.dependent_count(&Key::prop("a")), 0);
    }

    #[test]
    fn unsubscribe_during_notification_skips_removed_dependent() {
        let store = Observable::object();
        let second_count = Rc::new(Cell::new(0));
        let second_id = SubscriberId::new();

        let store_clone = store.clone();
        store.subscribe(
            Key::prop("a"),
            Subscriber::new(SubscriberId::new(), move || {
                store_clone.unsubscribe(&Key::prop("a"), second_id);
            }),
        );
        let count_clone = second_count.clone();
        store.subscribe(
            Key::prop("a"),
            Subscriber::new(second_id, move || count_clone.set(count_clone.get() + 1)),
        );

        store.set("a", 1).unwrap();
        assert_eq!(second_count.get(), 0);
    }

    #[test]
    fn subscribe_during_notification_waits_for_next_write() {
        let store = Observable::object();
        let late_count = Rc::new(Cell::new(0));
        let added = Rc::new(Cell::new(false));

        let (store_clone, count_clone) = (store.clone(), late_count.clone());
        store.subscribe(
            Key::prop("a"),
            Subscriber::new(SubscriberId::new(), move || {
                if added.replace(true) {
                    return;
                }
                let count = count_clone.clone();
                store_clone.subscribe(
                    Key::prop("a"),
                    Subscriber::new(SubscriberId::new(), move || count.set(count.get() + 1)),
                );
            }),
        );

        store.set("a", 1).unwrap();
        assert_eq!(late_count.get(), 0);
        assert_eq!(store.dependent_count(&Key::prop("a")), 2);

        store.set("a", 2).unwrap();
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn reentrant_write_runs_depth_first() {
        let store = Observable::object();
        let log = Rc::new(RefCell::new(Vec::new()));

        let store_clone = store.clone();
        let log_a = log.clone();
        store.subscribe(
            Key::prop("a"),
            Subscriber::new(SubscriberId::new(), move || {
                log_a.borrow_mut().push("a");
                store_clone.set("b", 1).unwrap();
                log_a.borrow_mut().push("a-done");
            }),
        );
        let log_b = log.clone();
        store.subscribe(
            Key::prop("b"),
            Subscriber::new(SubscriberId::new(), move || log_b.borrow_mut().push("b")),
        );

        store.set("a", 1).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "a-done"]);
    }

    #[test]
    fn array_push_notifies_shape() {
        let store = Observable::from_json(json!([1, 2])).unwrap();
        let (shape, _) = counter(&store, Key::Shape);

        store.push(3).unwrap();
        assert_eq!(shape.get(), 1);
        assert_eq!(store.get("length"), Value::from(3));
        assert_eq!(store.get_index(2), Value::from(3));
    }

    #[test]
    fn array_insert_notifies_shifted_indices() {
        let store = Observable::from_json(json!(["a", "b", "c"])).unwrap();
        let (first, _) = counter(&store, Key::Index(0));
        let (last, _) = counter(&store, Key::Index(2));

        store.insert(1, "x").unwrap();
        assert_eq!(first.get(), 0);
        assert_eq!(last.get(), 1);
        assert_eq!(store.to_json(), json!(["a", "x", "b", "c"]));

        store.remove_index(0).unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(store.to_json(), json!(["x", "b", "c"]));
    }

    #[test]
    fn array_set_past_end_is_invalid() {
        let store = Observable::array();
        store.set_index(0, "a").unwrap();
        assert!(matches!(store.set_index(5, "b"), Err(Error::InvalidPath { .. })));
        assert!(matches!(store.set("name", "b"), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn object_operations_reject_array_methods() {
        let store = Observable::object();
        assert!(matches!(
            store.push(1),
            Err(Error::UnsupportedOperation { operation: "push", kind: "object" })
        ));
    }

    #[test]
    fn set_path_through_scalar_fails() {
        let store = Observable::from_json(json!({"a": {"b": 1}, "s": "text"})).unwrap();

        store.set_path(&"a.b".parse().unwrap(), 2).unwrap();
        assert_eq!(store.get_path(&"a.b".parse().unwrap()), Value::from(2));

        let err = store.set_path(&"s.length".parse().unwrap(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        let err = store.set_path(&"missing.x".parse().unwrap(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn nested_path_through_array() {
        let store = Observable::from_json(json!({"items": [{"name": "a"}, {"name": "b"}]})).unwrap();
        let path = "items[1].name".parse().unwrap();

        assert_eq!(store.get_path(&path), Value::from("b"));
        store.set_path(&path, "z").unwrap();
        assert_eq!(store.to_json(), json!({"items": [{"name": "a"}, {"name": "z"}]}));
    }

    #[test]
    fn reads_are_tracked_only_inside_a_context() {
        let store = Observable::from_json(json!({"a": 1, "b": 2})).unwrap();

        store.get("a");
        let ctx = ReactiveContext::enter(SubscriberId::new());
        store.get("b");
        store.len();
        let deps = ctx.take_dependencies();
        drop(ctx);

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].key(), &Key::prop("b"));
        assert_eq!(deps[1].key(), &Key::Shape);
    }

    #[test]
    fn object_remove_preserves_order() {
        let store = Observable::from_json(json!({"a": 1, "b": 2, "c": 3})).unwrap();
        assert_eq!(store.remove("b").unwrap(), Value::from(2));
        assert_eq!(store.keys(), vec![Rc::from("a"), Rc::from("c")]);
    }
}
