//! In-memory host tree.
//!
//! Useful for headless runs and tests: every mutation is appended to an
//! operation log, the tree can be rendered to markup, and events can be
//! dispatched to attached listeners.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::host::HostTree;
use crate::node::{Callback, Value};

new_key_type! {
    pub struct HostId;
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    Create { id: HostId, tag: String },
    CreateText { id: HostId, content: String },
    SetText { id: HostId, content: String },
    SetProperty {
        id: HostId,
        key: String,
        value: Value,
    },
    RemoveProperty { id: HostId, key: String },
    AttachListener { id: HostId, event: String },
    DetachListener { id: HostId, event: String },
    Insert {
        parent: HostId,
        child: HostId,
        before: Option<HostId>,
    },
    Remove { parent: HostId, child: HostId },
}

impl HostOp {
    /// The node this operation mutated (the parent for structural ops).
    pub fn target(&self) -> HostId {
        match self {
            HostOp::Create { id, .. }
            | HostOp::CreateText { id, .. }
            | HostOp::SetText { id, .. }
            | HostOp::SetProperty { id, .. }
            | HostOp::RemoveProperty { id, .. }
            | HostOp::AttachListener { id, .. }
            | HostOp::DetachListener { id, .. } => *id,
            HostOp::Insert { parent, .. } | HostOp::Remove { parent, .. } => *parent,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, HostOp::Create { .. } | HostOp::CreateText { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostContent {
    Element(String),
    Text(String),
}

pub struct HostNode {
    pub content: HostContent,
    pub props: BTreeMap<String, Value>,
    pub children: Vec<HostId>,
    pub parent: Option<HostId>,
    listeners: BTreeMap<String, Vec<Callback>>,
}

impl HostNode {
    fn new(content: HostContent) -> Self {
        Self {
            content,
            props: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            listeners: BTreeMap::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.content {
            HostContent::Element(tag) => Some(tag),
            HostContent::Text(_) => None,
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

#[derive(Default)]
pub struct MemoryHost {
    nodes: SlotMap<HostId, HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to mount into. Not recorded as an operation.
    pub fn create_container(&mut self, tag: &str) -> HostId {
        self.nodes
            .insert(HostNode::new(HostContent::Element(tag.to_string())))
    }

    pub fn node(&self, id: HostId) -> Option<&HostNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// First element with `tag` under `root`, depth-first.
    pub fn find(&self, root: HostId, tag: &str) -> Option<HostId> {
        self.find_all(root, tag).into_iter().next()
    }

    pub fn find_all(&self, root: HostId, tag: &str) -> Vec<HostId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.tag() == Some(tag) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Calls every listener attached to `id` for `event`. Returns how many ran.
    pub fn dispatch(&self, id: HostId, event: &str) -> usize {
        let handlers: Vec<Callback> = self
            .nodes
            .get(id)
            .and_then(|n| n.listeners.get(event))
            .cloned()
            .unwrap_or_default();
        for h in &handlers {
            h();
        }
        handlers.len()
    }

    /// Markup of the children of `id` (the container itself is not printed).
    pub fn inner_markup(&self, id: HostId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_markup(*child, &mut out);
        }
        out
    }

    pub fn markup(&self, id: HostId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.content {
            HostContent::Text(t) => out.push_str(t),
            HostContent::Element(tag) => {
                let _ = write!(out, "<{tag}");
                for (k, v) in &node.props {
                    let _ = write!(out, " {k}=\"{v}\"");
                }
                out.push('>');
                for child in &node.children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn detach(&mut self, child: HostId) {
        let parent = self.nodes.get_mut(child).and_then(|n| n.parent.take());
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|c| *c != child);
        }
    }

    fn node_mut(&mut self, id: HostId) -> Option<&mut HostNode> {
        let node = self.nodes.get_mut(id);
        if node.is_none() {
            log::warn!("memory host: unknown node {id:?}");
        }
        node
    }
}

impl HostTree for MemoryHost {
    type Node = HostId;

    fn create_node(&mut self, tag: &str) -> HostId {
        let id = self
            .nodes
            .insert(HostNode::new(HostContent::Element(tag.to_string())));
        self.ops.push(HostOp::Create {
            id,
            tag: tag.to_string(),
        });
        id
    }

    fn create_text(&mut self, content: &str) -> HostId {
        let id = self
            .nodes
            .insert(HostNode::new(HostContent::Text(content.to_string())));
        self.ops.push(HostOp::CreateText {
            id,
            content: content.to_string(),
        });
        id
    }

    fn set_text(&mut self, node: &HostId, content: &str) {
        if let Some(n) = self.node_mut(*node) {
            n.content = HostContent::Text(content.to_string());
        }
        self.ops.push(HostOp::SetText {
            id: *node,
            content: content.to_string(),
        });
    }

    fn set_property(&mut self, node: &HostId, key: &str, value: &Value) {
        if let Some(n) = self.node_mut(*node) {
            n.props.insert(key.to_string(), value.clone());
        }
        self.ops.push(HostOp::SetProperty {
            id: *node,
            key: key.to_string(),
            value: value.clone(),
        });
    }

    fn remove_property(&mut self, node: &HostId, key: &str) {
        if let Some(n) = self.node_mut(*node) {
            n.props.remove(key);
        }
        self.ops.push(HostOp::RemoveProperty {
            id: *node,
            key: key.to_string(),
        });
    }

    fn attach_listener(&mut self, node: &HostId, event: &str, handler: &Callback) {
        if let Some(n) = self.node_mut(*node) {
            n.listeners
                .entry(event.to_string())
                .or_default()
                .push(handler.clone());
        }
        self.ops.push(HostOp::AttachListener {
            id: *node,
            event: event.to_string(),
        });
    }

    fn detach_listener(&mut self, node: &HostId, event: &str, handler: &Callback) {
        if let Some(list) = self
            .node_mut(*node)
            .and_then(|n| n.listeners.get_mut(event))
        {
            list.retain(|h| !Rc::ptr_eq(h, handler));
        }
        self.ops.push(HostOp::DetachListener {
            id: *node,
            event: event.to_string(),
        });
    }

    fn insert_child(&mut self, parent: &HostId, child: &HostId, before: Option<&HostId>) {
        self.detach(*child);
        if let Some(p) = self.node_mut(*parent) {
            let at = before
                .and_then(|b| p.children.iter().position(|c| c == b))
                .unwrap_or(p.children.len());
            p.children.insert(at, *child);
        }
        if let Some(c) = self.nodes.get_mut(*child) {
            c.parent = Some(*parent);
        }
        self.ops.push(HostOp::Insert {
            parent: *parent,
            child: *child,
            before: before.copied(),
        });
    }

    fn remove_child(&mut self, parent: &HostId, child: &HostId) {
        if let Some(p) = self.node_mut(*parent) {
            p.children.retain(|c| c != child);
        }
        // Detached nodes are dropped together with their subtree.
        let mut stack = vec![*child];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(id) {
                stack.extend(n.children);
            }
        }
        self.ops.push(HostOp::Remove {
            parent: *parent,
            child: *child,
        });
    }
}
