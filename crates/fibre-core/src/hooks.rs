//! # Hooks
//!
//! Function components get persistent state through a [`Scope`]. Hooks are
//! order-based: the Nth hook call in one pass refers to the Nth record stored
//! on the work node in the previous pass. Never call hooks conditionally or in
//! a loop whose length changes between passes.
//!
//! ```rust
//! use fibre_core::*;
//!
//! fn counter(cx: &mut Scope<'_>, _props: &Props) -> Element {
//!     let (count, set_count) = cx.use_state(|| 0);
//!
//!     cx.use_effect(Some(count), move || {
//!         log::info!("count is now {count}");
//!     });
//!
//!     Some(
//!         element("button")
//!             .on("click", move || set_count.update(|c| c + 1))
//!             .child(format!("Count = {count}")),
//!     )
//! }
//! ```
//!
//! - `use_state` returns the current value and a [`Setter`]. Setting an equal
//!   value does nothing; anything else schedules a full rerender of the root.
//! - `use_effect` queues its closure when the dependencies differ from the
//!   previous pass (or are `None`). Queued effects run after the commit has
//!   touched the host tree; the previous cleanup runs right before.
//! - `use_ref` is a mutable box that survives passes and never schedules.

use std::any::Any;
use std::cell::{self, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::effects::{CleanupSlot, Dispose, PendingEffect};
use crate::scheduler::Updater;

/// One persisted hook record.
#[derive(Clone)]
pub(crate) enum Hook {
    State(Rc<dyn Any>),
    Effect(EffectCell),
    Ref(Rc<dyn Any>),
}

#[derive(Clone)]
pub(crate) struct EffectCell {
    deps: Option<Rc<dyn Any>>,
    cleanup: CleanupSlot,
}

impl Hook {
    fn kind(&self) -> &'static str {
        match self {
            Hook::State(_) => "state",
            Hook::Effect(_) => "effect",
            Hook::Ref(_) => "ref",
        }
    }

    pub(crate) fn cleanup_slot(&self) -> Option<&CleanupSlot> {
        match self {
            Hook::Effect(cell) => Some(&cell.cleanup),
            _ => None,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Effect(cell) => f
                .debug_struct("Effect")
                .field("has_deps", &cell.deps.is_some())
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Evaluation context of one function component for one pass.
pub struct Scope<'a> {
    component: &'a str,
    previous: Vec<Hook>,
    matched: bool,
    hooks: Vec<Hook>,
    effects: &'a mut Vec<PendingEffect>,
    updater: &'a Updater,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        component: &'a str,
        previous: Option<Vec<Hook>>,
        effects: &'a mut Vec<PendingEffect>,
        updater: &'a Updater,
    ) -> Self {
        let matched = previous.is_some();
        Self {
            component,
            previous: previous.unwrap_or_default(),
            matched,
            hooks: Vec::new(),
            effects,
            updater,
        }
    }

    /// The record carried over from the previous pass at the current index.
    fn carried(&self, expected: &'static str) -> Option<Hook> {
        let index = self.hooks.len();
        let hook = self.previous.get(index)?;
        debug_assert_eq!(
            hook.kind(),
            expected,
            "{}: hook {index} changed kind between passes",
            self.component
        );
        if hook.kind() != expected {
            log::warn!(
                "{}: hook {} changed from {} to {}; replacing it",
                self.component,
                index,
                hook.kind(),
                expected
            );
            return None;
        }
        Some(hook.clone())
    }

    pub fn use_state<T>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        let carried = match self.carried("state") {
            Some(Hook::State(any)) => match any.downcast::<RefCell<T>>() {
                Ok(cell) => Some(cell),
                Err(_) => {
                    log::warn!(
                        "{}: state hook {} changed type; replacing.",
                        self.component,
                        self.hooks.len()
                    );
                    None
                }
            },
            _ => None,
        };
        let cell = carried.unwrap_or_else(|| Rc::new(RefCell::new(init())));
        self.hooks.push(Hook::State(cell.clone()));
        let value = cell.borrow().clone();
        (
            value,
            Setter {
                cell,
                updater: self.updater.clone(),
            },
        )
    }

    /// Queues `effect` when `deps` differ from last pass; `None` means every pass.
    pub fn use_effect<D, R, F>(&mut self, deps: Option<D>, effect: F)
    where
        D: PartialEq + 'static,
        R: Into<Dispose>,
        F: FnOnce() -> R + 'static,
    {
        let prev = match self.carried("effect") {
            Some(Hook::Effect(cell)) => Some(cell),
            _ => None,
        };
        let changed = match (&prev, &deps) {
            (Some(p), Some(next)) => {
                p.deps.as_ref().and_then(|d| d.downcast_ref::<D>()) != Some(next)
            }
            _ => true,
        };
        let cleanup = prev.map(|p| p.cleanup).unwrap_or_default();
        if changed {
            self.effects.push(PendingEffect {
                slot: cleanup.clone(),
                run: Box::new(move || effect().into()),
            });
        }
        self.hooks.push(Hook::Effect(EffectCell {
            deps: deps.map(|d| Rc::new(d) as Rc<dyn Any>),
            cleanup,
        }));
    }

    /// `use_effect` with no dependency list: reruns after every commit.
    pub fn use_effect_always<R, F>(&mut self, effect: F)
    where
        R: Into<Dispose>,
        F: FnOnce() -> R + 'static,
    {
        self.use_effect(None::<()>, effect);
    }

    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Ref<T> {
        let carried = match self.carried("ref") {
            Some(Hook::Ref(any)) => any.downcast::<RefCell<T>>().ok(),
            _ => None,
        };
        let cell = carried.unwrap_or_else(|| Rc::new(RefCell::new(init())));
        self.hooks.push(Hook::Ref(cell.clone()));
        Ref(cell)
    }

    /// Schedules a rerender without touching any state.
    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }

    pub(crate) fn finish(self) -> Vec<Hook> {
        if self.matched {
            debug_assert_eq!(
                self.previous.len(),
                self.hooks.len(),
                "{}: hook count changed between passes",
                self.component
            );
        }
        if self.matched && self.previous.len() != self.hooks.len() {
            log::warn!(
                "{}: hook count changed from {} to {}",
                self.component,
                self.previous.len(),
                self.hooks.len()
            );
        }
        self.hooks
    }
}

/// Write half of a state hook.
pub struct Setter<T> {
    cell: Rc<RefCell<T>>,
    updater: Updater,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            updater: self.updater.clone(),
        }
    }
}

impl<T: PartialEq + 'static> Setter<T> {
    pub fn set(&self, value: T) {
        if *self.cell.borrow() == value {
            return;
        }
        *self.cell.borrow_mut() = value;
        self.updater.request_rerender();
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }
}

/// Mutable cell returned by `use_ref`. Writes never schedule a rerender.
pub struct Ref<T>(Rc<RefCell<T>>);

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Ref<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn borrow(&self) -> cell::Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Ref<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
