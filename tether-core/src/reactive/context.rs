//! Reactive Context
//!
//! The reactive context tracks which binding is currently evaluating its
//! expression. When a store key is read, the store asks the context whether
//! anyone is listening and, if so, records the read as a dependency.
//!
//! # Implementation
//!
//! We use a thread-local stack. Entering a context pushes a frame; the guard
//! returned by [`ReactiveContext::enter`] pops it when dropped. Frames nest,
//! so a binding created while another is being applied tracks only its own
//! reads. [`ReactiveContext::untracked`] pushes a frame with no subscriber,
//! which hides reads from every enclosing frame.

use std::cell::RefCell;

use super::store::Dependency;
use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug)]
struct ContextEntry {
    /// The evaluating binding, or `None` for an untracked section.
    subscriber_id: Option<SubscriberId>,
    /// Keys read during this evaluation, in first-read order, deduplicated.
    dependencies: Vec<Dependency>,
}

/// Guard that pops the context when dropped.
///
/// The stack stays balanced even if the evaluation panics.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a new tracking context for the given subscriber.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber_id,
                dependencies: Vec::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Run `f` with dependency tracking suspended.
    pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
        let _ctx = Self::push(None);
        f()
    }

    /// Check if a read right now would be recorded.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber_id))
    }

    /// Record a dependency on the given store key.
    ///
    /// Called by stores when they are read. Repeated reads of the same key
    /// within one evaluation are recorded once.
    pub fn track_dependency(dependency: Dependency) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if entry.subscriber_id.is_some() && !entry.dependencies.contains(&dependency) {
                    entry.dependencies.push(dependency);
                }
            }
        });
    }

    /// Take the dependencies collected so far in this context.
    pub fn take_dependencies(&self) -> Vec<Dependency> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow_mut()
                .last_mut()
                .map(|entry| std::mem::take(&mut entry.dependencies))
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, entry.subscriber_id
                );
            }
        });
    }
}
