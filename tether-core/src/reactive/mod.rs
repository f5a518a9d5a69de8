//! Reactive Primitives
//!
//! This module implements the observable data model that bindings read from:
//! stores, scopes, and the tracking context that links them.
//!
//! # Concepts
//!
//! ## Stores
//!
//! An [`Observable`] is an object or array whose reads are tracked and whose
//! writes notify. Nested objects and arrays are observables too, so a path
//! such as `items[2].name` is trackable at every step.
//!
//! ## Scopes
//!
//! A [`Scope`] is what expressions are evaluated against: a chain of stores.
//! List items get a child scope carrying `$index`, `$key` and `$value` that
//! still sees the enclosing scope.
//!
//! ## Tracking
//!
//! While a binding evaluates its expression it holds a [`ReactiveContext`].
//! Every store read in that window is recorded; afterwards the binding
//! subscribes to exactly the keys it read and drops subscriptions it no
//! longer needs.
//!
//! # Implementation Notes
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Writes notify
//! synchronously and depth-first: a write made from inside a notification
//! completes all of its own notifications before the outer one continues.

mod context;
mod scope;
mod store;
mod subscriber;
mod value;

pub use context::ReactiveContext;
pub use scope::Scope;
pub use store::{Dependency, Key, Observable};
pub use subscriber::{Subscriber, SubscriberId};
pub use value::{Function, Value};
