use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// A cleanup that does nothing.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl From<()> for Dispose {
    fn from(_: ()) -> Self {
        Dispose::noop()
    }
}

impl fmt::Debug for Dispose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dispose").field(&self.is_pending()).finish()
    }
}

/// Helper to return a cleanup from an effect.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// Cleanup slot of one effect hook, shared by every version of its work node.
pub(crate) type CleanupSlot = Rc<RefCell<Option<Dispose>>>;

/// Runs the cleanup currently parked in `slot`, if any.
pub(crate) fn run_cleanup(slot: &CleanupSlot) {
    let prev = slot.borrow_mut().take();
    if let Some(d) = prev {
        d.run();
    }
}

/// An effect queued during the render walk, run after the commit's mutations.
pub(crate) struct PendingEffect {
    pub(crate) slot: CleanupSlot,
    pub(crate) run: Box<dyn FnOnce() -> Dispose>,
}

impl PendingEffect {
    /// Prior cleanup first, then the effect; its cleanup replaces the old one.
    pub(crate) fn flush(self) {
        run_cleanup(&self.slot);
        let next = (self.run)();
        *self.slot.borrow_mut() = Some(next);
    }
}
