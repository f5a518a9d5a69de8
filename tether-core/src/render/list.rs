//! `m-for` list rendering.
//!
//! Rendered items sit directly before an empty text anchor that owns the list
//! binding. Every time the collection changes (shape, an entry, or the
//! collection itself) the rendered items are reconciled against it by item
//! identity:
//!
//! - a rendered item is reused for the first unclaimed new item with the same
//!   identity (same observable, or same primitive value; for mappings also
//!   the same key), keeping its nodes and bindings;
//! - rendered items left unclaimed are removed and torn down;
//! - new items without a match are rendered;
//! - items are then put in collection order, moving only those out of place.
//!
//! Reused items get their `$index`, `$key` and `$value` locals updated, which
//! notifies only the bindings that read them.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::binding::{remove_node, teardown_bindings, Binding, BindingKind};
use crate::dom::Node;
use crate::reactive::{Observable, Scope, Value};

use super::blueprint::{Blueprint, ListBlueprint};
use super::{Renderer, Slot};

const INDEX: &str = "$index";
const KEY: &str = "$key";
const VALUE: &str = "$value";

/// Identity used to match rendered items with collection items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    entry: Option<Rc<str>>,
    identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Collection(u64),
    Primitive(&'static str, String),
}

impl ItemKey {
    fn new(entry: Option<Rc<str>>, item: &Value) -> Self {
        let identity = match item {
            Value::Collection(store) => Identity::Collection(store.id()),
            other => Identity::Primitive(other.type_name(), other.to_text()),
        };
        Self { entry, identity }
    }
}

struct RenderedItem {
    key: ItemKey,
    locals: Observable,
    slot: Slot,
}

struct ListState {
    renderer: Renderer,
    body: Rc<Blueprint>,
    scope: Scope,
    anchor: Node,
    items: Vec<RenderedItem>,
}

/// Instantiate an `m-for`. Returns a fragment holding the items and anchor.
pub(crate) fn instantiate(renderer: &Renderer, blueprint: &ListBlueprint, scope: &Scope) -> (Node, Slot) {
    let document = renderer.document();
    let fragment = document.create_document_fragment();
    let anchor = document.create_text_node("");
    fragment.append_child(&anchor);

    let state = Rc::new(RefCell::new(ListState {
        renderer: renderer.clone(),
        body: blueprint.body.clone(),
        scope: scope.clone(),
        anchor: anchor.clone(),
        items: Vec::new(),
    }));

    let apply_state = state.clone();
    let binding = Binding::reactive(
        anchor.clone(),
        BindingKind::List,
        blueprint.collection.clone(),
        scope.clone(),
        move |binding, value| {
            reconcile(&apply_state, &value);
            if binding.is_torn_down() {
                release(&apply_state);
            }
        },
    );
    binding.on_teardown(move || release(&state));

    (fragment, Slot::Fixed(anchor))
}

/// Tear down every rendered item. Items stay where they are in the tree.
fn release(state: &RefCell<ListState>) {
    let items = std::mem::take(&mut state.borrow_mut().items);
    for item in items {
        teardown_bindings(&item.slot.current());
    }
}

/// Collection entries as (locals key, identity entry, item).
fn entries(value: &Value) -> Vec<(Value, Option<Rc<str>>, Value)> {
    let Some(collection) = value.as_collection() else {
        return Vec::new();
    };
    if collection.is_array() {
        collection
            .values()
            .into_iter()
            .enumerate()
            .map(|(index, item)| (Value::from(index), None, item))
            .collect()
    } else {
        collection
            .entries()
            .into_iter()
            .map(|(key, item)| (Value::String(key.clone()), Some(key), item))
            .collect()
    }
}

fn reconcile(state: &RefCell<ListState>, value: &Value) {
    let (renderer, body, scope, anchor, previous) = {
        let mut state = state.borrow_mut();
        let previous = std::mem::take(&mut state.items);
        (
            state.renderer.clone(),
            state.body.clone(),
            state.scope.clone(),
            state.anchor.clone(),
            previous,
        )
    };

    let entries = entries(value);
    let mut unclaimed: HashMap<ItemKey, VecDeque<usize>> = HashMap::new();
    for (position, item) in previous.iter().enumerate() {
        unclaimed.entry(item.key.clone()).or_default().push_back(position);
    }

    // Match before creating so removals happen before new items render.
    let keys: Vec<ItemKey> = entries
        .iter()
        .map(|(_, entry, item)| ItemKey::new(entry.clone(), item))
        .collect();
    let matches: Vec<Option<usize>> = keys
        .iter()
        .map(|key| unclaimed.get_mut(key).and_then(VecDeque::pop_front))
        .collect();

    let mut previous: Vec<Option<RenderedItem>> = previous.into_iter().map(Some).collect();
    let claimed: Vec<Option<RenderedItem>> = matches
        .iter()
        .map(|m| m.and_then(|position| previous[position].take()))
        .collect();

    let removed = previous.iter().flatten().count();
    for item in previous.into_iter().flatten() {
        remove_node(&item.slot.current());
    }

    let mut created = 0;
    let mut items = Vec::with_capacity(entries.len());
    let mut fresh = Vec::with_capacity(entries.len());
    for ((key, (local_key, _, item)), reused) in keys.into_iter().zip(entries).zip(claimed) {
        match reused {
            Some(rendered) => {
                update_locals(&rendered.locals, &local_key, &item);
                items.push(rendered);
                fresh.push(None);
            }
            None => {
                let locals = Observable::object_from([
                    (INDEX, local_key.clone()),
                    (KEY, local_key),
                    (VALUE, item.clone()),
                ]);
                let object = item.as_collection().filter(|c| !c.is_array()).cloned();
                let child = scope.child(locals.clone(), object);
                let (node, slot) = renderer.instantiate(&body, &child);
                items.push(RenderedItem { key, locals, slot });
                fresh.push(Some(node));
                created += 1;
            }
        }
    }

    place(&anchor, &items, fresh);
    debug!(
        collection = ?value.as_collection().map(Observable::id),
        items = items.len(),
        created,
        removed,
        "list reconciled"
    );

    state.borrow_mut().items = items;
}

fn update_locals(locals: &Observable, key: &Value, item: &Value) {
    for (name, value) in [(INDEX, key), (KEY, key), (VALUE, item)] {
        if &locals.get_untracked(name) != value {
            if let Err(error) = locals.set(name, value.clone()) {
                warn!(local = name, %error, "failed to update loop local");
            }
        }
    }
}

/// Order rendered items before the anchor, back to front.
fn place(anchor: &Node, items: &[RenderedItem], fresh: Vec<Option<Node>>) {
    let Some(parent) = anchor.parent() else {
        return;
    };
    let mut next = anchor.clone();
    for (item, fresh) in items.iter().zip(fresh).rev() {
        let current = item.slot.current();
        match fresh {
            Some(node) => parent.insert_before(&node, Some(&next)),
            None if current.next_sibling().as_ref() != Some(&next) => {
                parent.insert_before(&current, Some(&next))
            }
            None => {}
        }
        next = current;
    }
}
