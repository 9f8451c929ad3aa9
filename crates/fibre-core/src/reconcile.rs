//! The reconciler: one work node per step, children matched by position.

use crate::component::{Children, EvalContext, evaluate};
use crate::effects::PendingEffect;
use crate::fiber::{DiffTag, Fiber, FiberKey, FiberTree};
use crate::scheduler::Updater;

/// Per-pass lists the reconciler appends to.
pub(crate) struct Pending<'a> {
    pub(crate) deletions: &'a mut Vec<FiberKey>,
    pub(crate) effects: &'a mut Vec<PendingEffect>,
    pub(crate) updater: &'a Updater,
}

/// Expands `key`, builds its child work nodes and returns the next unit.
pub(crate) fn perform_unit_of_work<N>(
    tree: &mut FiberTree<N>,
    key: FiberKey,
    pending: Pending<'_>,
) -> Option<FiberKey> {
    log::trace!("unit of work: {:?}", tree[key].kind);
    let children = evaluate(
        tree,
        key,
        EvalContext {
            effects: pending.effects,
            updater: pending.updater,
        },
    );
    reconcile_children(tree, key, children, pending.deletions);
    next_unit(tree, key)
}

/// Lock-step walk of the next descriptions against the previous version's
/// children. Same kind at the same index is an update; anything else is an
/// insert of the new description plus a deletion of the old node.
pub(crate) fn reconcile_children<N>(
    tree: &mut FiberTree<N>,
    wip: FiberKey,
    elements: Children,
    deletions: &mut Vec<FiberKey>,
) {
    let mut old = tree[wip].alternate.and_then(|a| tree[a].child);
    let mut elements = elements.into_iter();
    let mut prev: Option<FiberKey> = None;

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        let matched = match (&element, old) {
            (Some(e), Some(o)) => e.kind.same_as(&tree[o].kind),
            _ => false,
        };

        let fresh = element.map(|e| {
            let fiber = if matched {
                Fiber::from_node(e, wip, old, DiffTag::Update)
            } else {
                Fiber::from_node(e, wip, None, DiffTag::Insert)
            };
            tree.insert(fiber)
        });

        if let Some(o) = old {
            if !matched {
                tree[o].tag = DiffTag::Delete;
                deletions.push(o);
            }
            old = tree[o].sibling;
        }

        if let Some(k) = fresh {
            match prev {
                None => tree[wip].child = Some(k),
                Some(p) => tree[p].sibling = Some(k),
            }
            prev = Some(k);
        }
    }
}

/// Depth-first pre-order successor: first child, else the nearest sibling of
/// `key` or of one of its ancestors.
pub(crate) fn next_unit<N>(tree: &FiberTree<N>, key: FiberKey) -> Option<FiberKey> {
    if let Some(child) = tree[key].child {
        return Some(child);
    }
    let mut cur = key;
    loop {
        if let Some(sibling) = tree[cur].sibling {
            return Some(sibling);
        }
        cur = tree[cur].parent?;
    }
}
