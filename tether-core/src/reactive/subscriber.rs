//! Subscriber types for the reactive system.
//!
//! A Subscriber is the callback a store keeps for one dependent computation
//! (in practice, a binding) on one tracked key.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Each binding gets a unique ID when created. Stores use it to avoid
/// duplicate subscriptions and to unsubscribe precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber to a tracked store key.
///
/// Cloning is cheap: the callback is shared. Stores clone their dependent
/// lists before notifying so callbacks are free to subscribe and unsubscribe.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    notify: Rc<dyn Fn()>,
}

impl Subscriber {
    /// Create a new subscriber with the given notification callback.
    pub fn new<F>(id: SubscriberId, notify: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            id,
            notify: Rc::new(notify),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Notify the subscriber that one of its dependencies changed.
    pub fn notify(&self) {
        (self.notify)();
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
