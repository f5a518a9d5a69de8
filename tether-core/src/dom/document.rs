//! Arena-backed document tree.
//!
//! Every node of a [`Document`] lives in one arena vector; a [`Node`] is a
//! counted handle (document + index). A detached node stays valid while any
//! handle to it exists. Once a node has neither a parent nor a handle its
//! slot, and those of its unreferenced descendants, is reclaimed and reused
//! by later allocations.
//!
//! Tree operations mirror the host DOM calls the renderer needs. Operations
//! that would corrupt the tree (inserting a node into itself or its own
//! descendant, a reference node with the wrong parent, nodes from another
//! document) are logged and ignored.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::warn;

use super::custom::CustomElementRegistry;
use super::event::{Event, Listener, ListenerId};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Fragment,
}

struct ElementData {
    local_name: String,
    attributes: IndexMap<String, String>,
    /// The live `value` property; falls back to the attribute until set.
    value: Option<String>,
    checked: Option<bool>,
    component: Option<Rc<dyn Any>>,
}

enum NodeKind {
    Element(ElementData),
    Text(String),
    Fragment,
}

struct ListenerEntry {
    id: ListenerId,
    kind: Rc<str>,
    listener: Listener,
}

struct NodeData {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    listeners: Vec<ListenerEntry>,
    vacant: bool,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            vacant: false,
        }
    }

    fn vacant() -> Self {
        Self {
            vacant: true,
            ..Self::new(NodeKind::Fragment)
        }
    }

    fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

struct DocumentInner {
    id: u64,
    nodes: RefCell<Vec<NodeData>>,
    /// Live handle count per slot.
    handles: RefCell<Vec<usize>>,
    /// Slots whose handle count dropped to zero since the last sweep.
    released: RefCell<Vec<usize>>,
    free: RefCell<Vec<usize>>,
    next_listener: Cell<u64>,
    custom_elements: CustomElementRegistry,
}

/// A document owning a tree arena and its custom element definitions.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
                nodes: RefCell::new(Vec::new()),
                handles: RefCell::new(Vec::new()),
                released: RefCell::new(Vec::new()),
                free: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                custom_elements: CustomElementRegistry::default(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.inner.custom_elements
    }

    /// A plain element. Tag names are case-insensitive.
    pub fn create_element(&self, tag_name: &str) -> Node {
        self.alloc(NodeKind::Element(ElementData {
            local_name: tag_name.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            value: None,
            checked: None,
            component: None,
        }))
    }

    /// An element backed by a custom element instance.
    pub fn create_custom_element(&self, tag_name: &str, component: Rc<dyn Any>) -> Node {
        let node = self.create_element(tag_name);
        node.with_mut(|data| {
            if let Some(element) = data.element_mut() {
                element.component = Some(component);
            }
        });
        node
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn create_document_fragment(&self) -> Node {
        self.alloc(NodeKind::Fragment)
    }

    /// Number of live nodes: attached, or detached but still referenced.
    pub fn node_count(&self) -> usize {
        self.collect();
        self.inner.nodes.borrow().len() - self.inner.free.borrow().len()
    }

    fn alloc(&self, kind: NodeKind) -> Node {
        self.collect();
        let index = match self.inner.free.borrow_mut().pop() {
            Some(index) => {
                self.inner.nodes.borrow_mut()[index] = NodeData::new(kind);
                index
            }
            None => {
                let mut nodes = self.inner.nodes.borrow_mut();
                nodes.push(NodeData::new(kind));
                self.inner.handles.borrow_mut().push(0);
                nodes.len() - 1
            }
        };
        self.node(index)
    }

    fn node(&self, index: usize) -> Node {
        self.inner.handles.borrow_mut()[index] += 1;
        Node {
            document: self.clone(),
            index,
        }
    }

    fn release(&self, index: usize) {
        let mut handles = self.inner.handles.borrow_mut();
        handles[index] = handles[index].saturating_sub(1);
        if handles[index] == 0 {
            self.inner.released.borrow_mut().push(index);
        }
    }

    /// Reclaim released slots that are detached, together with their
    /// unreferenced descendants.
    ///
    /// Reclaimed node data is dropped after the arena borrows end, since
    /// listeners and components may own handles of their own.
    fn collect(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.inner.released.borrow_mut());
            if pending.is_empty() {
                return;
            }
            let mut reclaimed = Vec::new();
            {
                let mut nodes = self.inner.nodes.borrow_mut();
                let handles = self.inner.handles.borrow();
                let mut free = self.inner.free.borrow_mut();
                while let Some(index) = pending.pop() {
                    let data = &nodes[index];
                    if data.vacant || data.parent.is_some() || handles[index] > 0 {
                        continue;
                    }
                    let data = std::mem::replace(&mut nodes[index], NodeData::vacant());
                    for &child in &data.children {
                        nodes[child].parent = None;
                        pending.push(child);
                    }
                    free.push(index);
                    reclaimed.push(data);
                }
            }
            drop(reclaimed);
        }
    }

    fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("nodes", &self.inner.nodes.try_borrow().map(|n| n.len()).ok())
            .finish()
    }
}

/// Handle to one node of a [`Document`].
pub struct Node {
    document: Document,
    index: usize,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.document.node(self.index)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.document.release(self.index);
    }
}

impl Node {
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn with<R>(&self, f: impl FnOnce(&NodeData) -> R) -> R {
        f(&self.document.inner.nodes.borrow()[self.index])
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut NodeData) -> R) -> R {
        f(&mut self.document.inner.nodes.borrow_mut()[self.index])
    }

    pub fn node_type(&self) -> NodeType {
        self.with(|data| match data.kind {
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Fragment => NodeType::Fragment,
        })
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    pub fn is_fragment(&self) -> bool {
        self.node_type() == NodeType::Fragment
    }

    /// Upper-case tag name, as hosts report it.
    pub fn tag_name(&self) -> Option<String> {
        self.local_name().map(|name| name.to_ascii_uppercase())
    }

    pub fn local_name(&self) -> Option<String> {
        self.with(|data| data.element().map(|e| e.local_name.clone()))
    }

    /// Text of a text node; `None` for elements and fragments.
    pub fn node_value(&self) -> Option<String> {
        self.with(|data| match &data.kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn set_node_value(&self, text: &str) {
        self.with_mut(|data| {
            if let NodeKind::Text(current) = &mut data.kind {
                current.clear();
                current.push_str(text);
            }
        });
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let nodes = self.document.inner.nodes.borrow();
        let mut text = String::new();
        collect_text(&nodes, self.index, &mut text);
        text
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with(|data| {
            data.element()
                .and_then(|e| e.attributes.get(&name.to_ascii_lowercase()).cloned())
        })
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.with_mut(|data| {
            if let Some(element) = data.element_mut() {
                element
                    .attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
            }
        });
    }

    /// The form `value` property. Never dispatches events.
    pub fn value(&self) -> String {
        self.with(|data| {
            data.element()
                .and_then(|e| e.value.clone().or_else(|| e.attributes.get("value").cloned()))
                .unwrap_or_default()
        })
    }

    pub fn set_value(&self, value: &str) {
        self.with_mut(|data| {
            if let Some(element) = data.element_mut() {
                element.value = Some(value.to_string());
            }
        });
    }

    pub fn checked(&self) -> bool {
        self.with(|data| {
            data.element()
                .map(|e| e.checked.unwrap_or_else(|| e.attributes.contains_key("checked")))
                .unwrap_or(false)
        })
    }

    pub fn set_checked(&self, checked: bool) {
        self.with_mut(|data| {
            if let Some(element) = data.element_mut() {
                element.checked = Some(checked);
            }
        });
    }

    /// The custom element instance behind this node, if any.
    pub fn component(&self) -> Option<Rc<dyn Any>> {
        self.with(|data| data.element().and_then(|e| e.component.clone()))
    }

    /// The custom element instance, downcast to `T`.
    pub fn component_as<T: Any>(&self) -> Option<Rc<T>> {
        self.component()?.downcast::<T>().ok()
    }

    pub fn parent(&self) -> Option<Node> {
        self.with(|data| data.parent)
            .map(|index| self.document.node(index))
    }

    pub fn children(&self) -> Vec<Node> {
        self.with(|data| data.children.clone())
            .into_iter()
            .map(|index| self.document.node(index))
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.with(|data| data.children.len())
    }

    pub fn first_child(&self) -> Option<Node> {
        self.with(|data| data.children.first().copied())
            .map(|index| self.document.node(index))
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let nodes = self.document.inner.nodes.borrow();
        let parent = nodes[self.index].parent?;
        let siblings = &nodes[parent].children;
        let position = siblings.iter().position(|&i| i == self.index)?;
        siblings.get(position + 1).map(|&index| self.document.node(index))
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        if !self.document.ptr_eq(&other.document) {
            return false;
        }
        let nodes = self.document.inner.nodes.borrow();
        let mut current = Some(other.index);
        while let Some(index) = current {
            if index == self.index {
                return true;
            }
            current = nodes[index].parent;
        }
        false
    }

    /// This node and all its descendants, pre-order.
    pub fn subtree(&self) -> Vec<Node> {
        let nodes = self.document.inner.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![self.index];
        while let Some(index) = stack.pop() {
            out.push(self.document.node(index));
            stack.extend(nodes[index].children.iter().rev());
        }
        out
    }

    /// Descendant elements with the given tag (`*` matches all), pre-order.
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<Node> {
        self.subtree()
            .into_iter()
            .skip(1)
            .filter(|node| {
                node.local_name()
                    .is_some_and(|name| tag_name == "*" || name.eq_ignore_ascii_case(tag_name))
            })
            .collect()
    }

    pub fn append_child(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Insert `child` before `reference` (or at the end). Inserting a
    /// fragment moves its children, leaving it empty.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
        if !self.document.ptr_eq(&child.document) {
            warn!(parent = ?self, child = ?child, "cannot insert a node from another document");
            return;
        }
        if child.contains(self) {
            warn!(parent = ?self, child = ?child, "cannot insert a node into its own subtree");
            return;
        }
        if let Some(reference) = reference {
            if reference.parent().as_ref() != Some(self) {
                warn!(parent = ?self, reference = ?reference, "reference node is not a child");
                return;
            }
        }

        if child.is_fragment() {
            for moved in child.children() {
                self.insert_before(&moved, reference);
            }
            return;
        }

        let reference = match reference {
            Some(r) if r == child => child.next_sibling(),
            other => other.cloned(),
        };

        child.remove();
        let mut nodes = self.document.inner.nodes.borrow_mut();
        let children = &mut nodes[self.index].children;
        let position = reference
            .and_then(|r| children.iter().position(|&i| i == r.index))
            .unwrap_or(children.len());
        children.insert(position, child.index);
        nodes[child.index].parent = Some(self.index);
    }

    /// Put `replacement` where this node is, detaching this node.
    pub fn replace_with(&self, replacement: &Node) {
        if replacement == self {
            return;
        }
        let Some(parent) = self.parent() else {
            warn!(node = ?self, "cannot replace a node without a parent");
            return;
        };
        parent.insert_before(replacement, Some(self));
        self.remove();
    }

    /// Detach from the parent. A no-op for detached nodes.
    pub fn remove(&self) {
        let mut nodes = self.document.inner.nodes.borrow_mut();
        if let Some(parent) = nodes[self.index].parent.take() {
            nodes[parent].children.retain(|&i| i != self.index);
        }
    }

    pub fn add_event_listener<F>(&self, kind: &str, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        let counter = &self.document.inner.next_listener;
        let id = ListenerId(counter.get());
        counter.set(id.0 + 1);

        self.with_mut(|data| {
            data.listeners.push(ListenerEntry {
                id,
                kind: kind.into(),
                listener: Rc::new(listener),
            })
        });
        id
    }

    /// Returns whether the listener was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.with_mut(|data| {
            let before = data.listeners.len();
            data.listeners.retain(|entry| entry.id != id);
            data.listeners.len() != before
        })
    }

    pub fn listener_count(&self) -> usize {
        self.with(|data| data.listeners.len())
    }

    /// Deliver `event` to this node's listeners for its kind, in order.
    ///
    /// Listeners removed by an earlier listener during the same dispatch are
    /// skipped. Events do not bubble.
    pub fn dispatch_event(&self, event: Event) {
        let event = event.with_target(self.clone());
        let listeners: Vec<(ListenerId, Listener)> = self.with(|data| {
            data.listeners
                .iter()
                .filter(|entry| &*entry.kind == event.kind())
                .map(|entry| (entry.id, entry.listener.clone()))
                .collect()
        });

        for (id, listener) in listeners {
            let live = self.with(|data| data.listeners.iter().any(|entry| entry.id == id));
            if live {
                listener(&event);
            }
        }
    }
}

fn collect_text(nodes: &[NodeData], index: usize, out: &mut String) {
    match &nodes[index].kind {
        NodeKind::Text(text) => out.push_str(text),
        _ => {
            for &child in &nodes[index].children {
                collect_text(nodes, child, out);
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.document.ptr_eq(&other.document)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.document.inner.id.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(nodes) = self.document.inner.nodes.try_borrow() else {
            return write!(f, "Node({}:{})", self.document.inner.id, self.index);
        };
        match &nodes[self.index].kind {
            NodeKind::Element(e) => {
                write!(f, "Node({}:{} <{}>)", self.document.inner.id, self.index, e.local_name)
            }
            NodeKind::Text(text) => {
                write!(f, "Node({}:{} {:?})", self.document.inner.id, self.index, text)
            }
            NodeKind::Fragment => {
                write!(f, "Node({}:{} #fragment)", self.document.inner.id, self.index)
            }
        }
    }
}
