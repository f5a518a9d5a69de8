//! `m-on:<event>` listeners.

use tracing::{trace, warn};

use crate::binding::Binding;
use crate::dom::{Event, Node};
use crate::expr::Expression;
use crate::reactive::{Scope, Value};

/// Attach a listener calling the scope method named by `handler`.
///
/// The method is looked up at dispatch time, so replacing it in the scope
/// takes effect on the next event.
pub(crate) fn bind(element: &Node, event: &str, handler: &Expression, scope: &Scope) {
    let (listener_handler, listener_scope) = (handler.clone(), scope.clone());
    let listener = element.add_event_listener(event, move |dispatched| {
        invoke(&listener_handler, &listener_scope, dispatched);
    });
    Binding::listener(element.clone(), event, handler.clone(), scope.clone(), listener);
}

fn invoke(handler: &Expression, scope: &Scope, event: &Event) {
    let Some(path) = handler.as_path() else {
        return;
    };
    match scope.resolve_method(path) {
        Some((receiver, Value::Function(method))) => {
            trace!(handler = %handler, event = event.kind(), "invoking event handler");
            if let Err(error) = method.call(&receiver, event, scope) {
                warn!(handler = %handler, event = event.kind(), %error, "event handler failed");
            }
        }
        Some((_, other)) => {
            warn!(
                handler = %handler,
                found = other.type_name(),
                "event handler is not a function"
            );
        }
        None => warn!(handler = %handler, event = event.kind(), "event handler not found"),
    }
}
