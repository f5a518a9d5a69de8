//! Bindings and their registry.
//!
//! A [`Binding`] keeps one target of a live node in sync with one expression.
//! The [`BindingRegistry`] remembers which bindings belong to which node so
//! that removing a node can release everything rendered beneath it.

#[allow(clippy::module_inception)]
mod binding;
mod registry;

pub use binding::{Binding, BindingKind};
pub use registry::{remove_node, teardown_bindings, BindingRegistry};
