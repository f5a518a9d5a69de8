//! Events and listener handles.

use std::rc::Rc;

use super::Node;

/// A dispatched event. The target is filled in by [`Node::dispatch_event`].
#[derive(Debug, Clone)]
pub struct Event {
    kind: Rc<str>,
    target: Option<Node>,
}

impl Event {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.into(),
            target: None,
        }
    }

    /// The event type, e.g. `click` or `input`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    pub(crate) fn with_target(mut self, target: Node) -> Self {
        self.target = Some(target);
        self
    }
}

/// Handle for removing a listener added with [`Node::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub(crate) type Listener = Rc<dyn Fn(&Event)>;
