//! Binding Registry
//!
//! Side table from live node to the bindings registered under it. Nodes carry
//! no binding metadata of their own; teardown of a subtree is a walk over the
//! subtree looking each node up here.
//!
//! # Thread Safety
//!
//! Nodes and bindings are `Rc`-based, so the registry is thread-local. Entries
//! are taken out of the table before their bindings are torn down, so teardown
//! hooks may freely re-enter the registry.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use crate::dom::Node;

use super::Binding;

thread_local! {
    static REGISTRY: RefCell<HashMap<Node, Vec<Binding>>> = RefCell::new(HashMap::new());
}

/// The per-thread registry of live bindings.
pub struct BindingRegistry;

impl BindingRegistry {
    /// Record `binding` under its current node.
    pub fn register(binding: &Binding) {
        REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .entry(binding.node())
                .or_default()
                .push(binding.clone());
        });
    }

    /// Bindings registered under `node`, in registration order.
    pub fn bindings_for(node: &Node) -> Vec<Binding> {
        REGISTRY.with(|registry| registry.borrow().get(node).cloned().unwrap_or_default())
    }

    /// Number of nodes with at least one binding.
    pub fn len() -> usize {
        REGISTRY.with(|registry| registry.borrow().len())
    }

    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    /// Number of nodes in `root`'s subtree with at least one binding.
    pub fn count_within(root: &Node) -> usize {
        let subtree = root.subtree();
        REGISTRY.with(|registry| {
            let registry = registry.borrow();
            subtree.iter().filter(|node| registry.contains_key(node)).count()
        })
    }

    /// Move `binding` from its current node to `node`.
    pub fn rekey(binding: &Binding, node: &Node) {
        let previous = binding.node();
        if &previous == node {
            return;
        }
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            if let Some(entry) = registry.get_mut(&previous) {
                entry.retain(|b| !b.ptr_eq(binding));
                if entry.is_empty() {
                    registry.remove(&previous);
                }
            }
            if !binding.is_torn_down() {
                registry.entry(node.clone()).or_default().push(binding.clone());
            }
        });
        binding.set_node(node.clone());
    }

    /// Drop `binding` from its node's entry.
    pub(crate) fn unregister(binding: &Binding) {
        let node = binding.node();
        let removed = REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            let entry = registry.get_mut(&node)?;
            entry.retain(|b| !b.ptr_eq(binding));
            if entry.is_empty() {
                registry.remove(&node)
            } else {
                None
            }
        });
        drop(removed);
    }

    fn take(nodes: &[Node]) -> Vec<Binding> {
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            nodes
                .iter()
                .filter_map(|node| registry.remove(node))
                .flatten()
                .collect()
        })
    }
}

/// Tear down every binding registered under `node` or any descendant.
///
/// Idempotent: nodes without bindings are skipped. Returns the number of
/// bindings torn down.
pub fn teardown_bindings(node: &Node) -> usize {
    let bindings = BindingRegistry::take(&node.subtree());
    for binding in &bindings {
        binding.teardown();
    }
    if !bindings.is_empty() {
        debug!(node = ?node, bindings = bindings.len(), "tore down bindings");
    }
    bindings.len()
}

/// Detach `node` from its parent and tear down its bindings.
pub fn remove_node(node: &Node) -> usize {
    node.remove();
    teardown_bindings(node)
}
