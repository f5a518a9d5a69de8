//! Host Document
//!
//! The engine writes directly to live nodes. This module is the host it
//! writes to: a document tree with elements, text and fragments, event
//! listeners, a custom element registry and a markup parser producing the
//! static template trees the renderer compiles.

mod custom;
mod document;
mod event;
mod markup;

pub use custom::{CustomElementRegistry, ElementConstructor};
pub use document::{Document, Node, NodeType};
pub use event::{Event, ListenerId};
pub use markup::{parse_markup, Attribute, ElementTemplate, TemplateNode};
