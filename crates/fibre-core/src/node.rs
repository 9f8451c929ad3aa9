//! Immutable descriptions of what the host tree should look like.
//!
//! A [`Node`] is cheap to clone: its kind, properties and children are all
//! reference counted, so the reconciler can hand child descriptions to work
//! nodes without deep copies.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::component::{Component, Stateful};
use crate::hooks::Scope;

/// Property key under which a text description stores its content.
pub const TEXT_KEY: &str = "text";

pub type Callback = Rc<dyn Fn()>;

/// What a component evaluation produces. `None` renders nothing.
pub type Element = Option<Node>;

/// A property value. Handlers compare by identity, everything else by value.
#[derive(Clone)]
pub enum Value {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(Callback),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Callback> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Value::Handler(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Handler(_) => write!(f, "<handler>"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Callback> for Value {
    fn from(h: Callback) -> Self {
        Value::Handler(h)
    }
}

/// Properties of a description plus its child descriptions.
#[derive(Clone, Default)]
pub struct Props {
    attrs: Rc<BTreeMap<String, Value>>,
    children: Rc<[Node]>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Rc::make_mut(&mut self.attrs).insert(key.into(), value.into());
        self
    }

    /// Adds an event handler. `on("click", ..)` is stored under `onclick`.
    pub fn on(self, event: &str, handler: impl Fn() + 'static) -> Self {
        let handler: Callback = Rc::new(handler);
        self.with(format!("on{event}"), handler)
    }

    pub(crate) fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children.into();
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.attrs.iter()).finish()
    }
}

/// Discriminator shared by descriptions and work nodes.
#[derive(Clone)]
pub enum Kind {
    Host(Rc<str>),
    Text,
    Fragment,
    Component(Component),
}

impl Kind {
    /// Positional matching rule: same tag, same component, or both text/fragment.
    pub fn same_as(&self, other: &Kind) -> bool {
        match (self, other) {
            (Kind::Host(a), Kind::Host(b)) => a == b,
            (Kind::Text, Kind::Text) | (Kind::Fragment, Kind::Fragment) => true,
            (Kind::Component(a), Kind::Component(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Kinds that own a host node once committed.
    pub fn is_host_backed(&self) -> bool {
        matches!(self, Kind::Host(_) | Kind::Text)
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Host(tag) => write!(f, "<{tag}>"),
            Kind::Text => write!(f, "#text"),
            Kind::Fragment => write!(f, "Fragment"),
            Kind::Component(c) => write!(f, "{}", c.name()),
        }
    }
}

impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        Kind::Host(tag.into())
    }
}

impl From<Component> for Kind {
    fn from(c: Component) -> Self {
        Kind::Component(c)
    }
}

/// Slot that receives the host handle of the node it is attached to.
///
/// Handles are stored type-erased; read them back with the host's node type,
/// e.g. `node_ref.get::<HostId>()`.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<Option<Rc<dyn Any>>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<N: Clone + 'static>(&self) -> Option<N> {
        self.0.borrow().as_ref()?.downcast_ref::<N>().cloned()
    }

    pub fn is_attached(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub(crate) fn attach<N: 'static>(&self, node: N) {
        *self.0.borrow_mut() = Some(Rc::new(node));
    }

    pub(crate) fn detach(&self) {
        self.0.borrow_mut().take();
    }

    pub(crate) fn same_as(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.is_attached()).finish()
    }
}

/// Returns an empty ref; pass it to [`Node::node_ref`].
pub fn create_ref() -> NodeRef {
    NodeRef::new()
}

/// One immutable description node.
#[derive(Clone)]
pub struct Node {
    pub(crate) kind: Kind,
    pub(crate) props: Props,
    pub(crate) node_ref: Option<NodeRef>,
}

impl Node {
    pub fn new(kind: impl Into<Kind>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props,
            node_ref: None,
        }
    }

    pub fn text(content: impl Into<Value>) -> Self {
        let content = match content.into() {
            Value::Str(s) => s,
            other => other.to_string().into(),
        };
        Self::new(Kind::Text, Props::new().with(TEXT_KEY, Value::Str(content)))
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[Node] {
        self.props.children()
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props = self.props.with(key, value);
        self
    }

    pub fn on(mut self, event: &str, handler: impl Fn() + 'static) -> Self {
        self.props = self.props.on(event, handler);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        let mut kids = self.props.children().to_vec();
        kids.push(child.into());
        self.props = self.props.with_children(kids);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.props = self
            .props
            .with_children(children.into_iter().map(Into::into).collect());
        self
    }

    pub fn node_ref(mut self, r: &NodeRef) -> Self {
        self.node_ref = Some(r.clone());
        self
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("props", &self.props)
            .field("children", &self.props.children())
            .finish()
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::text(s)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::text(i)
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::text(i)
    }
}

/// Builds a description: `kind` plus `props` plus `children`.
pub fn create_element<I>(kind: impl Into<Kind>, props: Props, children: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    Node::new(kind, props).with_children(children)
}

/// Host element with no properties; chain `.attr`, `.on` and `.child`.
pub fn element(tag: &str) -> Node {
    Node::new(tag, Props::new())
}

pub fn text(content: impl Into<Value>) -> Node {
    Node::text(content)
}

pub fn fragment<I>(children: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    create_element(Kind::Fragment, Props::new(), children)
}

/// Description of a stateless function component.
pub fn component<F>(render: F, props: Props) -> Node
where
    F: Fn(&mut Scope<'_>, &Props) -> Element + 'static,
{
    Node::new(Component::function(render), props)
}

/// Description of a stateful component instance.
pub fn stateful<C: Stateful>(props: Props) -> Node {
    Node::new(Component::stateful::<C>(), props)
}
