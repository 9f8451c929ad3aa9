use std::fmt;

use crate::node::{Callback, Value};

/// The mutable visual tree the committer writes to.
///
/// Only the committer calls these, and only inside a commit, so a host never
/// observes a half-applied pass. Handles are owned by exactly one committed
/// work node at a time.
pub trait HostTree {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn create_node(&mut self, tag: &str) -> Self::Node;
    fn create_text(&mut self, content: &str) -> Self::Node;
    /// Replaces the whole content of a text node.
    fn set_text(&mut self, node: &Self::Node, content: &str);

    fn set_property(&mut self, node: &Self::Node, key: &str, value: &Value);
    fn remove_property(&mut self, node: &Self::Node, key: &str);

    fn attach_listener(&mut self, node: &Self::Node, event: &str, handler: &Callback);
    fn detach_listener(&mut self, node: &Self::Node, event: &str, handler: &Callback);

    /// Inserts `child` before `before`, or appends when `before` is `None`.
    fn insert_child(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        before: Option<&Self::Node>,
    );
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) {
        self.insert_child(parent, child, None);
    }
}

/// Listener name for a handler property: `onclick` and `onClick` map to `click`.
pub fn event_name(key: &str) -> String {
    key.strip_prefix("on").unwrap_or(key).to_ascii_lowercase()
}
