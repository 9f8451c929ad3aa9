//! Applying a finished pass to the host tree.
//!
//! Mutations happen in one synchronous call: deletions first, then a
//! pre-order walk of the new tree placing inserts and patching updates.
//! Deleted subtrees get their user callbacks before the host is touched at
//! all, so a panicking `will_unmount` leaves the host tree as it was.
//! Effects and instance callbacks are handed back to the session, which runs
//! them after the new tree has been published.

use smallvec::SmallVec;

use crate::component::InstanceCell;
use crate::effects::{CleanupSlot, run_cleanup};
use crate::fiber::{DiffTag, FiberKey, FiberTree, Lifecycle};
use crate::host::{HostTree, event_name};
use crate::node::{Kind, Props, TEXT_KEY, Value};

/// A deferred `did_mount` / `did_update`, in walk order.
pub(crate) enum LifecycleCall {
    Mount(InstanceCell),
    Update(InstanceCell),
}

impl LifecycleCall {
    pub(crate) fn run(self) {
        match self {
            LifecycleCall::Mount(i) => i.borrow().did_mount(),
            LifecycleCall::Update(i) => i.borrow().did_update(),
        }
    }
}

#[derive(Default)]
pub(crate) struct CommitReport {
    pub(crate) inserted: usize,
    pub(crate) updated: usize,
    pub(crate) deleted: usize,
    pub(crate) mutations: usize,
    pub(crate) lifecycle: SmallVec<[LifecycleCall; 4]>,
}

/// Applies every host mutation of the pass rooted at `wip`.
pub(crate) fn commit_mutations<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    wip: FiberKey,
    deletions: &[FiberKey],
) -> CommitReport {
    let mut report = CommitReport::default();

    for &key in deletions {
        unmount_subtree(tree, key);
    }
    for &key in deletions {
        report.mutations += detach_subtree(tree, host, key);
        report.deleted += 1;
    }

    let order = tree.preorder(wip);

    // Matched nodes take over their previous version's handle before any
    // insert looks for a host sibling.
    for &key in &order {
        if tree[key].tag != DiffTag::Update || !tree[key].kind.is_host_backed() {
            continue;
        }
        let alternate = tree[key].alternate;
        let handle = alternate.and_then(|a| tree[a].host.take());
        tree[key].host = handle;
    }

    for &key in &order {
        match tree[key].tag {
            DiffTag::Insert => {
                report.inserted += 1;
                report.mutations += commit_insert(tree, host, key);
            }
            DiffTag::Update => {
                report.updated += 1;
                report.mutations += commit_update(tree, host, key);
            }
            DiffTag::None | DiffTag::Delete => {}
        }

        let fiber = &tree[key];
        let Some(instance) = &fiber.instance else {
            continue;
        };
        match fiber.tag {
            DiffTag::Insert if fiber.lifecycle.contains(Lifecycle::MOUNT) => {
                report.lifecycle.push(LifecycleCall::Mount(instance.clone()));
            }
            DiffTag::Update if fiber.lifecycle.contains(Lifecycle::UPDATE) => {
                report.lifecycle.push(LifecycleCall::Update(instance.clone()));
            }
            _ => {}
        }
    }

    report
}

fn commit_insert<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    key: FiberKey,
) -> usize {
    let kind = tree[key].kind.clone();
    let props = tree[key].props.clone();
    match kind {
        Kind::Host(tag) => {
            let node = host.create_node(&tag);
            1 + apply_props(host, &node, &Props::new(), &props) + place(tree, host, key, node)
        }
        Kind::Text => {
            let node = host.create_text(props.str(TEXT_KEY).unwrap_or_default());
            1 + place(tree, host, key, node)
        }
        Kind::Fragment | Kind::Component(_) => 0,
    }
}

/// Records `node` on the fiber, attaches its ref and links it into the host tree.
fn place<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    key: FiberKey,
    node: H::Node,
) -> usize {
    if let Some(r) = &tree[key].node_ref {
        r.attach(node.clone());
    }
    tree[key].host = Some(node.clone());
    let Some(parent) = host_parent(tree, key) else {
        log::warn!("inserted node has no host ancestor: {:?}", tree[key].kind);
        return 0;
    };
    let before = host_sibling(tree, key);
    host.insert_child(&parent, &node, before.as_ref());
    1
}

fn commit_update<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    key: FiberKey,
) -> usize {
    let fiber = &tree[key];
    let Some(node) = fiber.host.clone() else {
        return 0;
    };
    let Some(prev) = fiber.alternate.and_then(|a| tree.get(a)) else {
        return 0;
    };

    if let Some(old_ref) = &prev.node_ref {
        if !fiber.node_ref.as_ref().is_some_and(|r| r.same_as(old_ref)) {
            old_ref.detach();
        }
    }
    if let Some(r) = &fiber.node_ref {
        r.attach(node.clone());
    }

    match &fiber.kind {
        Kind::Text => {
            let next = fiber.props.str(TEXT_KEY).unwrap_or_default();
            if prev.props.str(TEXT_KEY) == Some(next) {
                0
            } else {
                host.set_text(&node, next);
                1
            }
        }
        Kind::Host(_) => apply_props(host, &node, &prev.props, &fiber.props),
        Kind::Fragment | Kind::Component(_) => 0,
    }
}

/// Brings `node` from `prev` to `next`. Returns how many host calls it made.
///
/// Handlers are swapped wholesale: a changed handler is detached and the new
/// one attached. Plain values are set when unequal and removed when absent.
pub(crate) fn apply_props<H: HostTree>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
) -> usize {
    let mut calls = 0;

    for (key, old) in prev.iter() {
        let new = next.get(key);
        match old {
            Value::Handler(h) => {
                if new != Some(old) {
                    host.detach_listener(node, &event_name(key), h);
                    calls += 1;
                }
            }
            _ => {
                if !new.is_some_and(|v| !v.is_handler()) {
                    host.remove_property(node, key);
                    calls += 1;
                }
            }
        }
    }

    for (key, new) in next.iter() {
        if prev.get(key) == Some(new) {
            continue;
        }
        match new {
            Value::Handler(h) => host.attach_listener(node, &event_name(key), h),
            value => host.set_property(node, key, value),
        }
        calls += 1;
    }

    calls
}

/// Tears down the subtree at `key` and detaches its topmost host nodes.
/// Returns how many host calls were made.
pub(crate) fn commit_deletion<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    key: FiberKey,
) -> usize {
    unmount_subtree(tree, key);
    detach_subtree(tree, host, key)
}

/// Runs `will_unmount` and effect cleanups in the subtree at `key`, parent
/// before child, and clears its refs.
///
/// Each instance is unmounted at most once: the flag is cleared before the
/// call, so a pass replayed after a panic skips what already ran.
fn unmount_subtree<N>(tree: &mut FiberTree<N>, key: FiberKey) {
    for k in tree.preorder(key) {
        let fiber = &mut tree[k];
        let unmount = fiber.lifecycle.contains(Lifecycle::UNMOUNT);
        fiber.lifecycle.remove(Lifecycle::UNMOUNT);
        let instance = fiber.instance.clone().filter(|_| unmount);
        let slots: SmallVec<[CleanupSlot; 4]> = fiber
            .hooks
            .iter()
            .filter_map(|h| h.cleanup_slot())
            .cloned()
            .collect();
        let node_ref = fiber.node_ref.clone();

        if let Some(instance) = instance {
            instance.borrow().will_unmount();
        }
        for slot in &slots {
            run_cleanup(slot);
        }
        if let Some(r) = node_ref {
            r.detach();
        }
    }
}

fn detach_subtree<H: HostTree>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    key: FiberKey,
) -> usize {
    let Some(parent) = host_parent(tree, key) else {
        return 0;
    };
    let mut calls = 0;
    for k in topmost_hosts(tree, key) {
        if let Some(node) = tree[k].host.take() {
            host.remove_child(&parent, &node);
            calls += 1;
        }
    }
    calls
}

/// Host-backed nodes in the subtree at `key` that have no host-backed ancestor
/// inside it.
fn topmost_hosts<N>(tree: &FiberTree<N>, key: FiberKey) -> Vec<FiberKey> {
    if tree[key].host.is_some() {
        return vec![key];
    }
    tree.children(key)
        .into_iter()
        .flat_map(|c| topmost_hosts(tree, c))
        .collect()
}

/// Handle of the nearest ancestor that owns a host node.
fn host_parent<N: Clone>(tree: &FiberTree<N>, key: FiberKey) -> Option<N> {
    let mut cur = tree[key].parent;
    while let Some(k) = cur {
        if let Some(h) = &tree[k].host {
            return Some(h.clone());
        }
        cur = tree[k].parent;
    }
    None
}

/// The host node `key`'s node must be inserted before, if any.
///
/// Searches following siblings (climbing out of host-less parents) for the
/// first node that is already attached. Inserts later in the walk are skipped
/// since they are not placed yet.
fn host_sibling<N: Clone>(tree: &FiberTree<N>, key: FiberKey) -> Option<N> {
    let mut cur = key;
    loop {
        let mut next = tree[cur].sibling;
        while next.is_none() {
            let parent = tree[cur].parent?;
            if tree[parent].host.is_some() {
                return None;
            }
            cur = parent;
            next = tree[cur].sibling;
        }
        let sibling = next?;
        if let Some(h) = first_attached(tree, sibling) {
            return Some(h);
        }
        cur = sibling;
    }
}

fn first_attached<N: Clone>(tree: &FiberTree<N>, key: FiberKey) -> Option<N> {
    let fiber = &tree[key];
    if fiber.tag == DiffTag::Insert {
        return None;
    }
    if fiber.kind.is_host_backed() {
        return fiber.host.clone();
    }
    tree.children(key)
        .into_iter()
        .find_map(|c| first_attached(tree, c))
}
