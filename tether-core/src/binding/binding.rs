//! Binding Implementation
//!
//! A binding links one expression, evaluated in one scope, to one target on
//! a live node.
//!
//! # How Bindings Work
//!
//! 1. When created, the binding evaluates its expression inside a tracking
//!    context and applies the result to its target.
//!
//! 2. Every store key read during the evaluation becomes a dependency. The
//!    binding subscribes to each one.
//!
//! 3. When a dependency changes, the store calls back and the binding runs
//!    again. After each evaluation the subscriptions are reconciled with the
//!    keys just read: keys no longer read are unsubscribed, new keys are
//!    subscribed.
//!
//! 4. Teardown unsubscribes everything and runs the teardown hooks (for
//!    example removing an event listener). A torn down binding never runs
//!    again.
//!
//! The apply step runs untracked, so any bindings it creates (a list item,
//! a shown `m-if` branch) track their own reads only.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::trace;

use crate::dom::{ListenerId, Node};
use crate::expr::Expression;
use crate::reactive::{Dependency, Key, ReactiveContext, Scope, Subscriber, SubscriberId, Value};

use super::registry::BindingRegistry;

/// What a binding writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// The text of a text node.
    Text,
    /// An attribute of an element.
    Attribute(Rc<str>),
    /// An event listener (`m-on:<event>`). Never re-evaluated.
    Event(Rc<str>),
    /// A form control's value property (`m-bind:value`).
    Value,
    /// A checkbox's checked property (`m-bind:checked`).
    Checked,
    /// An `m-if` condition.
    Conditional,
    /// An `m-for` collection. Also tracks the collection's shape and keys.
    List,
}

type Apply = Box<dyn FnMut(&Binding, Value)>;
type Hook = Box<dyn FnOnce()>;

struct BindingInner {
    id: SubscriberId,
    node: RefCell<Node>,
    kind: BindingKind,
    expression: Expression,
    scope: Scope,
    handlers: RefCell<SmallVec<[Dependency; 4]>>,
    /// Taken out while running so the closure may reach back into the binding.
    apply: RefCell<Option<Apply>>,
    on_teardown: RefCell<Vec<Hook>>,
    torn_down: Cell<bool>,
    running: Cell<bool>,
    pending: Cell<bool>,
    run_count: Cell<usize>,
}

/// The unit of reactivity. Cloning shares the binding.
#[derive(Clone)]
pub struct Binding {
    inner: Rc<BindingInner>,
}

impl Binding {
    fn alloc(node: Node, kind: BindingKind, expression: Expression, scope: Scope, apply: Option<Apply>) -> Self {
        Self {
            inner: Rc::new(BindingInner {
                id: SubscriberId::new(),
                node: RefCell::new(node),
                kind,
                expression,
                scope,
                handlers: RefCell::new(SmallVec::new()),
                apply: RefCell::new(apply),
                on_teardown: RefCell::new(Vec::new()),
                torn_down: Cell::new(false),
                running: Cell::new(false),
                pending: Cell::new(false),
                run_count: Cell::new(0),
            }),
        }
    }

    /// Create a model-driven binding, run it once and register it under `node`.
    ///
    /// `apply` receives the binding (for its current node) and the freshly
    /// evaluated value.
    pub fn reactive<F>(node: Node, kind: BindingKind, expression: Expression, scope: Scope, apply: F) -> Self
    where
        F: FnMut(&Binding, Value) + 'static,
    {
        let binding = Self::alloc(node, kind, expression, scope, Some(Box::new(apply)));
        BindingRegistry::register(&binding);
        binding.run();
        binding
    }

    /// Register an already attached event listener as a binding of `node`.
    ///
    /// The listener is removed when the binding is torn down.
    pub fn listener(node: Node, event: &str, expression: Expression, scope: Scope, listener: ListenerId) -> Self {
        let target = node.clone();
        let binding = Self::alloc(node, BindingKind::Event(event.into()), expression, scope, None);
        binding.on_teardown(move || {
            target.remove_event_listener(listener);
        });
        BindingRegistry::register(&binding);
        binding
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// The node this binding is registered under.
    pub fn node(&self) -> Node {
        self.inner.node.borrow().clone()
    }

    pub(crate) fn set_node(&self, node: Node) {
        *self.inner.node.borrow_mut() = node;
    }

    pub fn kind(&self) -> &BindingKind {
        &self.inner.kind
    }

    pub fn expression(&self) -> &Expression {
        &self.inner.expression
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// Number of store keys currently subscribed to.
    pub fn handler_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.inner.handlers.borrow().to_vec()
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Number of completed evaluations.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `hook` when the binding is torn down (immediately if it already is).
    pub fn on_teardown(&self, hook: impl FnOnce() + 'static) {
        if self.is_torn_down() {
            hook();
        } else {
            self.inner.on_teardown.borrow_mut().push(Box::new(hook));
        }
    }

    /// Evaluate the expression, refresh subscriptions and apply the value.
    ///
    /// A run requested while this binding is already running is replayed
    /// once the current run returns.
    pub fn run(&self) {
        let inner = &self.inner;
        if inner.torn_down.get() {
            return;
        }
        if inner.running.get() {
            inner.pending.set(true);
            return;
        }

        inner.running.set(true);
        loop {
            inner.pending.set(false);

            let (value, dependencies) = {
                let ctx = ReactiveContext::enter(inner.id);
                let value = inner.expression.evaluate(&inner.scope);
                if inner.kind == BindingKind::List {
                    track_collection(&value);
                }
                (value, ctx.take_dependencies())
            };
            self.sync_handlers(dependencies);
            inner.run_count.set(inner.run_count.get() + 1);

            trace!(
                binding = ?inner.id,
                kind = ?inner.kind,
                expression = %inner.expression,
                handlers = self.handler_count(),
                "binding run"
            );

            let apply = inner.apply.borrow_mut().take();
            if let Some(mut apply) = apply {
                ReactiveContext::untracked(|| apply(self, value));
                if !inner.torn_down.get() {
                    *inner.apply.borrow_mut() = Some(apply);
                }
            }

            if inner.torn_down.get() || !inner.pending.get() {
                break;
            }
        }
        inner.running.set(false);
    }

    fn subscriber(&self) -> Subscriber {
        let weak: Weak<BindingInner> = Rc::downgrade(&self.inner);
        Subscriber::new(self.inner.id, move || {
            if let Some(inner) = weak.upgrade() {
                Binding { inner }.run();
            }
        })
    }

    fn sync_handlers(&self, dependencies: Vec<Dependency>) {
        let id = self.inner.id;
        let previous = std::mem::take(&mut *self.inner.handlers.borrow_mut());

        for stale in previous.iter().filter(|dep| !dependencies.contains(dep)) {
            stale.store().unsubscribe(stale.key(), id);
        }
        for added in dependencies.iter().filter(|dep| !previous.contains(dep)) {
            added.store().subscribe(added.key().clone(), self.subscriber());
        }

        *self.inner.handlers.borrow_mut() = dependencies.into_iter().collect();
    }

    /// Unsubscribe from every store, leave the registry and run the teardown
    /// hooks. Idempotent.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.torn_down.replace(true) {
            return;
        }
        BindingRegistry::unregister(self);

        let handlers = std::mem::take(&mut *inner.handlers.borrow_mut());
        for dependency in &handlers {
            dependency.store().unsubscribe(dependency.key(), inner.id);
        }
        inner.apply.borrow_mut().take();

        let hooks = std::mem::take(&mut *inner.on_teardown.borrow_mut());
        for hook in hooks {
            hook();
        }
        trace!(binding = ?inner.id, kind = ?inner.kind, released = handlers.len(), "binding torn down");
    }
}

/// Track the shape and every key of a list's collection.
fn track_collection(value: &Value) {
    let Some(collection) = value.as_collection() else {
        return;
    };
    collection.track(Key::Shape);
    if collection.is_array() {
        for index in 0..collection.len() {
            collection.track(Key::Index(index));
        }
    } else {
        for key in collection.keys() {
            collection.track(Key::Prop(key));
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("expression", &self.inner.expression.source())
            .field("handlers", &self.handler_count())
            .field("run_count", &self.run_count())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
