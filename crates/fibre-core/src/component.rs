//! # Components
//!
//! Two authoring models go through one evaluation path:
//!
//! - **Function components**: any `Fn(&mut Scope, &Props) -> Element`. State
//!   lives in hooks on the work node (see [`crate::hooks`]).
//! - **Stateful components**: a type implementing [`Stateful`]. One instance
//!   is created the first time a position renders it and stays bound to that
//!   position until it is deleted.
//!
//! The model is fixed when the description is built ([`Component::function`]
//! or [`Component::stateful`]), so evaluation never has to probe shapes.
//! Identity is the Rust type of the function or component: the same `fn`
//! item (or the same closure expression) always matches itself. Function
//! pointers all share one type, so they are told apart by address instead;
//! picking a page out of a `[fn(..) -> Element; N]` table swaps components as
//! expected. Boxed `dyn Fn` renderers are one kind to the reconciler no matter
//! what they wrap; reach for a pointer or a named `fn` when the choice must
//! reset state.
//!
//! ```rust
//! use fibre_core::*;
//!
//! struct Clock {
//!     ticks: i64,
//!     this: This<Clock>,
//! }
//!
//! impl Stateful for Clock {
//!     fn create(_props: &Props, this: This<Self>) -> Self {
//!         Clock { ticks: 0, this }
//!     }
//!
//!     fn render(&self, _props: &Props) -> Element {
//!         let this = self.this.clone();
//!         Some(
//!             element("span")
//!                 .on("click", move || this.set_state(|c| c.ticks += 1))
//!                 .child(self.ticks),
//!         )
//!     }
//! }
//!
//! let _ = stateful::<Clock>(Props::new());
//! ```

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::effects::PendingEffect;
use crate::fiber::{FiberKey, FiberTree, Lifecycle};
use crate::hooks::Scope;
use crate::node::{Element, Kind, Node, Props};
use crate::scheduler::Updater;

pub type RenderFn = dyn Fn(&mut Scope<'_>, &Props) -> Element;

/// A plain function pointer usable as a component.
pub type RenderPtr = fn(&mut Scope<'_>, &Props) -> Element;

#[derive(Clone)]
pub enum Component {
    Stateless(FunctionComponent),
    Stateful(ClassComponent),
}

#[derive(Clone)]
pub struct FunctionComponent {
    id: TypeId,
    /// Address of the function when `render` is a [`RenderPtr`].
    addr: Option<usize>,
    name: &'static str,
    render: Rc<RenderFn>,
}

#[derive(Clone, Copy)]
pub struct ClassComponent {
    id: TypeId,
    name: &'static str,
    construct: fn(&Props, Updater) -> InstanceCell,
}

impl Component {
    pub fn function<F>(render: F) -> Self
    where
        F: Fn(&mut Scope<'_>, &Props) -> Element + 'static,
    {
        let addr = (&render as &dyn Any)
            .downcast_ref::<RenderPtr>()
            .map(|f| *f as usize);
        Component::Stateless(FunctionComponent {
            id: TypeId::of::<F>(),
            addr,
            name: type_name::<F>(),
            render: Rc::new(render),
        })
    }

    pub fn stateful<C: Stateful>() -> Self {
        Component::Stateful(ClassComponent {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            construct: construct::<C>,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Component::Stateless(f) => f.name,
            Component::Stateful(c) => c.name,
        }
    }

    pub(crate) fn same_as(&self, other: &Component) -> bool {
        match (self, other) {
            (Component::Stateless(a), Component::Stateless(b)) => {
                a.id == b.id && a.addr == b.addr
            }
            (Component::Stateful(a), Component::Stateful(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Stateless(c) => write!(f, "Stateless({})", c.name),
            Component::Stateful(c) => write!(f, "Stateful({})", c.name),
        }
    }
}

/// A component with an instance and lifecycle callbacks.
///
/// Only `create` and `render` are required. `did_mount`, `did_update` and
/// `will_unmount` are deferred to the commit of the pass that inserted,
/// updated or deleted the instance's position.
pub trait Stateful: Sized + 'static {
    fn create(props: &Props, this: This<Self>) -> Self;

    /// Runs right before every `render`.
    fn will_render(&mut self, _props: &Props) {}

    fn render(&self, props: &Props) -> Element;

    fn did_mount(&mut self) {}

    fn did_update(&mut self) {}

    fn will_unmount(&mut self) {}
}

/// Handle a stateful instance keeps to itself, for use in event handlers.
pub struct This<C> {
    state: Weak<RefCell<C>>,
    updater: Updater,
}

impl<C> Clone for This<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            updater: self.updater.clone(),
        }
    }
}

impl<C: 'static> This<C> {
    /// Mutates the instance, then schedules a full rerender.
    ///
    /// Must not be called while the instance itself is borrowed (from inside
    /// `render` or a lifecycle method); mutate `self` and call
    /// [`force_update`](Self::force_update) there instead.
    pub fn set_state(&self, f: impl FnOnce(&mut C)) {
        match self.state.upgrade() {
            Some(state) => {
                f(&mut state.borrow_mut());
                self.updater.request_rerender();
            }
            None => log::debug!("set_state on an unmounted {}", type_name::<C>()),
        }
    }

    pub fn force_update(&self) {
        self.updater.request_rerender();
    }

    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.state.upgrade().map(|s| f(&s.borrow()))
    }
}

/// Type-erased instance as stored on a work node.
pub(crate) trait Instance {
    fn set_props(&mut self, props: Props);
    fn will_render(&mut self);
    fn render(&self) -> Element;
    fn did_mount(&self);
    fn did_update(&self);
    fn will_unmount(&self);
}

pub(crate) type InstanceCell = Rc<RefCell<dyn Instance>>;

struct Mounted<C> {
    state: Rc<RefCell<C>>,
    props: Props,
}

impl<C: Stateful> Instance for Mounted<C> {
    fn set_props(&mut self, props: Props) {
        self.props = props;
    }

    fn will_render(&mut self) {
        self.state.borrow_mut().will_render(&self.props);
    }

    fn render(&self) -> Element {
        self.state.borrow().render(&self.props)
    }

    fn did_mount(&self) {
        self.state.borrow_mut().did_mount();
    }

    fn did_update(&self) {
        self.state.borrow_mut().did_update();
    }

    fn will_unmount(&self) {
        self.state.borrow_mut().will_unmount();
    }
}

fn construct<C: Stateful>(props: &Props, updater: Updater) -> InstanceCell {
    let state = Rc::new_cyclic(|weak| {
        RefCell::new(C::create(
            props,
            This {
                state: weak.clone(),
                updater,
            },
        ))
    });
    Rc::new(RefCell::new(Mounted {
        state,
        props: props.clone(),
    }))
}

/// Next-level descriptions produced by one evaluation.
pub(crate) type Children = SmallVec<[Node; 4]>;

pub(crate) struct EvalContext<'a> {
    pub(crate) effects: &'a mut Vec<PendingEffect>,
    pub(crate) updater: &'a Updater,
}

/// Expands the work node at `key` by one level.
///
/// Function components run with a [`Scope`] seeded from the previous
/// version's hooks; stateful components reuse the previous version's instance
/// or construct one. Host and fragment nodes just hand back their children.
pub(crate) fn evaluate<N>(tree: &mut FiberTree<N>, key: FiberKey, cx: EvalContext<'_>) -> Children {
    let kind = tree[key].kind.clone();
    let props = tree[key].props.clone();
    let alternate = tree[key].alternate;

    match kind {
        Kind::Host(_) | Kind::Fragment => props.children().iter().cloned().collect(),
        Kind::Text => Children::new(),
        Kind::Component(Component::Stateless(f)) => {
            let previous = alternate.map(|a| tree[a].hooks.clone());
            let mut scope = Scope::new(f.name, previous, cx.effects, cx.updater);
            let element = (f.render)(&mut scope, &props);
            tree[key].hooks = scope.finish();
            element.into_iter().collect()
        }
        Kind::Component(Component::Stateful(c)) => {
            let reused = alternate.and_then(|a| tree[a].instance.clone());
            let (instance, lifecycle) = match reused {
                Some(instance) => {
                    instance.borrow_mut().set_props(props);
                    (instance, Lifecycle::UPDATE | Lifecycle::UNMOUNT)
                }
                None => (
                    (c.construct)(&props, cx.updater.clone()),
                    Lifecycle::MOUNT | Lifecycle::UNMOUNT,
                ),
            };
            instance.borrow_mut().will_render();
            let element = instance.borrow().render();
            let fiber = &mut tree[key];
            fiber.instance = Some(instance);
            fiber.lifecycle = lifecycle;
            element.into_iter().collect()
        }
    }
}
