//! Tether Core
//!
//! This crate provides the binding engine of the Tether template renderer.
//! It implements:
//!
//! - Observable stores with per-key dependency tracking
//! - Interpolation and property-path expressions
//! - Bindings and a node-keyed binding registry for teardown
//! - A live renderer with `m-if`, `m-for`, `m-on` and `m-bind` directives
//!
//! Rendering writes straight to live nodes: there is no virtual tree and no
//! diffing pass. When a store key changes, exactly the bindings that read it
//! re-run, synchronously, before the write returns.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Stores, scopes and the tracking context
//! - `expr`: Property paths and `{{...}}` templates
//! - `binding`: Bindings, the registry, `teardown_bindings` and `remove_node`
//! - `dom`: The host document, events, markup parsing, custom elements
//! - `render`: Template compilation and the directives
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tether_core::{remove_node, Document, Renderer, Scope};
//!
//! let renderer = Renderer::new(Document::new());
//! let scope = Scope::from_json(json!({ "greeting": "Hello World" }))?;
//!
//! let fragment = renderer.render("<div><p>{{greeting}}</p></div>".into(), &scope)?;
//! let div = fragment.first_child().unwrap();
//! assert_eq!(div.text_content(), "Hello World");
//!
//! // The binding updates the text in place.
//! scope.set("greeting", "Hello Everyone")?;
//! assert_eq!(div.text_content(), "Hello Everyone");
//!
//! // Removing the node releases its subscriptions.
//! remove_node(&div);
//! assert_eq!(scope.store().total_dependents(), 0);
//! # Ok::<(), tether_core::Error>(())
//! ```

pub mod binding;
pub mod config;
pub mod dom;
pub mod error;
pub mod expr;
pub mod reactive;
pub mod render;

pub use binding::{remove_node, teardown_bindings, Binding, BindingKind, BindingRegistry};
pub use config::RenderConfig;
pub use dom::{Document, ElementTemplate, Event, Node, TemplateNode};
pub use error::{Error, Result};
pub use expr::{Expression, Path};
pub use reactive::{Function, Observable, Scope, Value};
pub use render::{Renderer, TemplateSource};
