//! Work nodes and the arena that owns them.
//!
//! Both the committed tree and the work-in-progress tree live in one
//! [`FiberTree`]. Structural links (`parent`, `child`, `sibling`) and the
//! `alternate` link to the previous version are plain keys, so partially built
//! trees can be suspended between any two nodes and abandoned wholesale.

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};

use crate::component::InstanceCell;
use crate::hooks::Hook;
use crate::node::{Kind, Node, NodeRef, Props};

new_key_type! {
    pub struct FiberKey;
}

/// What the committer has to do for a work node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffTag {
    #[default]
    None,
    Insert,
    Update,
    Delete,
}

bitflags! {
    /// Deferred instance callbacks recorded by the component adapter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct Lifecycle: u8 {
        const MOUNT = 1;
        const UPDATE = 1 << 1;
        const UNMOUNT = 1 << 2;
    }
}

pub(crate) struct Fiber<N> {
    pub(crate) kind: Kind,
    pub(crate) props: Props,
    pub(crate) node_ref: Option<NodeRef>,
    pub(crate) host: Option<N>,
    pub(crate) parent: Option<FiberKey>,
    pub(crate) child: Option<FiberKey>,
    pub(crate) sibling: Option<FiberKey>,
    pub(crate) alternate: Option<FiberKey>,
    pub(crate) tag: DiffTag,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) instance: Option<InstanceCell>,
    pub(crate) lifecycle: Lifecycle,
}

impl<N> Fiber<N> {
    /// The container position: a fragment over the application's root description.
    pub(crate) fn root(container: N, element: Node, alternate: Option<FiberKey>) -> Self {
        let props = Props::new().with_children(vec![element]);
        Self {
            host: Some(container),
            alternate,
            ..Self::blank(Kind::Fragment, props, None, DiffTag::None)
        }
    }

    pub(crate) fn from_node(
        node: Node,
        parent: FiberKey,
        alternate: Option<FiberKey>,
        tag: DiffTag,
    ) -> Self {
        let Node {
            kind,
            props,
            node_ref,
        } = node;
        Self {
            parent: Some(parent),
            alternate,
            ..Self::blank(kind, props, node_ref, tag)
        }
    }

    fn blank(kind: Kind, props: Props, node_ref: Option<NodeRef>, tag: DiffTag) -> Self {
        Self {
            kind,
            props,
            node_ref,
            host: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            tag,
            hooks: Vec::new(),
            instance: None,
            lifecycle: Lifecycle::empty(),
        }
    }
}

pub(crate) struct FiberTree<N> {
    nodes: SlotMap<FiberKey, Fiber<N>>,
}

impl<N> FiberTree<N> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub(crate) fn insert(&mut self, fiber: Fiber<N>) -> FiberKey {
        self.nodes.insert(fiber)
    }

    pub(crate) fn get(&self, key: FiberKey) -> Option<&Fiber<N>> {
        self.nodes.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: FiberKey) -> Option<&mut Fiber<N>> {
        self.nodes.get_mut(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Keys of the direct children of `key`, in order.
    pub(crate) fn children(&self, key: FiberKey) -> Vec<FiberKey> {
        let mut out = Vec::new();
        let mut next = self.nodes.get(key).and_then(|f| f.child);
        while let Some(k) = next {
            out.push(k);
            next = self.nodes[k].sibling;
        }
        out
    }

    /// `key` and all its descendants, depth-first pre-order.
    pub(crate) fn preorder(&self, key: FiberKey) -> Vec<FiberKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if !self.nodes.contains_key(k) {
                continue;
            }
            out.push(k);
            stack.extend(self.children(k).into_iter().rev());
        }
        out
    }

    /// Frees `key` and everything below it. Returns how many nodes were freed.
    pub(crate) fn remove_subtree(&mut self, key: FiberKey) -> usize {
        let keys = self.preorder(key);
        for k in &keys {
            self.nodes.remove(*k);
        }
        keys.len()
    }
}

impl<N> Index<FiberKey> for FiberTree<N> {
    type Output = Fiber<N>;

    fn index(&self, key: FiberKey) -> &Fiber<N> {
        &self.nodes[key]
    }
}

impl<N> IndexMut<FiberKey> for FiberTree<N> {
    fn index_mut(&mut self, key: FiberKey) -> &mut Fiber<N> {
        &mut self.nodes[key]
    }
}
