//! `m-bind:<property>` two-way bindings.

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

use crate::binding::{Binding, BindingKind};
use crate::dom::Node;
use crate::expr::Expression;
use crate::reactive::{Scope, Value};

/// The form control property a two-way binding synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TwoWayTarget {
    /// `value`, written back on `input`.
    Value,
    /// `checked`, written back on `change`.
    Checked,
}

impl TwoWayTarget {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "value" => Some(Self::Value),
            "checked" => Some(Self::Checked),
            _ => None,
        }
    }

    fn event(self) -> &'static str {
        match self {
            Self::Value => "input",
            Self::Checked => "change",
        }
    }

    fn kind(self) -> BindingKind {
        match self {
            Self::Value => BindingKind::Value,
            Self::Checked => BindingKind::Checked,
        }
    }

    /// Set the property unless the control already shows `value`.
    fn write_to(self, node: &Node, value: &Value) {
        match self {
            Self::Value => {
                let text = value.to_text();
                if node.value() != text {
                    node.set_value(&text);
                }
            }
            Self::Checked => {
                let checked = value.is_truthy();
                if node.checked() != checked {
                    node.set_checked(checked);
                }
            }
        }
    }

    fn read_from(self, node: &Node) -> Value {
        match self {
            Self::Value => Value::from(node.value()),
            Self::Checked => Value::from(node.checked()),
        }
    }
}

/// Bind `target` of `element` to `expression` in both directions.
///
/// Model changes skip the write when the control already holds the value,
/// so a write-back is not echoed while a value that a dependent rewrites
/// during the write-back (a normalizer, for instance) lands in the control.
/// Events the control raises while a model change is being applied are not
/// written back.
pub(crate) fn bind(element: &Node, target: TwoWayTarget, expression: &Expression, scope: &Scope) {
    let applying = Rc::new(Cell::new(false));

    let guard = applying.clone();
    let binding = Binding::reactive(
        element.clone(),
        target.kind(),
        expression.clone(),
        scope.clone(),
        move |binding, value| {
            guard.set(true);
            target.write_to(&binding.node(), &value);
            guard.set(false);
        },
    );

    let (expression, scope) = (expression.clone(), scope.clone());
    let listener = element.add_event_listener(target.event(), move |event| {
        if applying.get() {
            return;
        }
        let Some(control) = event.target() else {
            return;
        };
        if let Err(error) = expression.write(&scope, target.read_from(control)) {
            warn!(expression = %expression, %error, "two-way write-back failed");
        }
    });

    let element = element.clone();
    binding.on_teardown(move || {
        element.remove_event_listener(listener);
    });
}
