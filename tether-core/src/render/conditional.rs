//! `m-if` conditional rendering.
//!
//! The directive's position in the tree is held by exactly one node at a
//! time: the rendered element while the condition is truthy, an empty text
//! placeholder while it is not. The condition binding is registered under
//! whichever node currently holds the position and is moved along with each
//! swap, so it survives the swap and is torn down with the position.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::binding::{teardown_bindings, Binding, BindingKind, BindingRegistry};
use crate::dom::Node;
use crate::reactive::Scope;

use super::blueprint::{Blueprint, ConditionalBlueprint};
use super::{Renderer, Slot};

pub(crate) struct ConditionalState {
    renderer: Renderer,
    body: Rc<Blueprint>,
    scope: Scope,
    shown: bool,
    placeholder: Node,
    current: Node,
}

impl ConditionalState {
    pub(crate) fn current(&self) -> Node {
        self.current.clone()
    }
}

/// Instantiate an `m-if`. Returns a fragment holding the initial occupant.
pub(crate) fn instantiate(
    renderer: &Renderer,
    blueprint: &ConditionalBlueprint,
    scope: &Scope,
) -> (Node, Slot) {
    let document = renderer.document();
    let fragment = document.create_document_fragment();
    let placeholder = document.create_text_node("");
    fragment.append_child(&placeholder);

    let state = Rc::new(RefCell::new(ConditionalState {
        renderer: renderer.clone(),
        body: blueprint.body.clone(),
        scope: scope.clone(),
        shown: false,
        placeholder: placeholder.clone(),
        current: placeholder.clone(),
    }));

    let apply_state = state.clone();
    Binding::reactive(
        placeholder,
        BindingKind::Conditional,
        blueprint.condition.clone(),
        scope.clone(),
        move |binding, value| toggle(&apply_state, binding, value.is_truthy()),
    );

    (fragment, Slot::Conditional(state))
}

fn toggle(state: &RefCell<ConditionalState>, binding: &Binding, show: bool) {
    let (renderer, body, scope, placeholder, current) = {
        let state = state.borrow();
        if state.shown == show {
            return;
        }
        (
            state.renderer.clone(),
            state.body.clone(),
            state.scope.clone(),
            state.placeholder.clone(),
            state.current.clone(),
        )
    };

    let next = if show {
        renderer.instantiate(&body, &scope).0
    } else {
        placeholder
    };

    BindingRegistry::rekey(binding, &next);
    if current.parent().is_some() {
        current.replace_with(&next);
    }
    teardown_bindings(&current);
    debug!(condition = %binding.expression(), shown = show, "conditional swapped");

    let mut state = state.borrow_mut();
    state.shown = show;
    state.current = next;
}
