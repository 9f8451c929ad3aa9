//! Cooperative pacing of the reconciler.
//!
//! The session never blocks: each drive processes work nodes one at a time and
//! asks a [`Deadline`] after every node whether it should hand control back to
//! the host. Rerender requests from setters only touch the [`Shared`] cells
//! below, so they are safe to issue from inside component evaluation, effects
//! and event handlers alike.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use web_time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Identifies one idle-callback request made to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host side of idle scheduling: "call me back when you are idle".
///
/// When the host gets around to it, it calls
/// [`Root::run_idle`](crate::Root::run_idle) with the ticket it was given.
pub trait IdleScheduler {
    fn request_idle(&self, ticket: Ticket);
    fn cancel_idle(&self, ticket: Ticket);
}

/// FIFO of requested tickets for headless hosts and tests.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<Ticket>>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn next(&self) -> Option<Ticket> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl IdleScheduler for ManualScheduler {
    fn request_idle(&self, ticket: Ticket) {
        self.queue.borrow_mut().push_back(ticket);
    }

    fn cancel_idle(&self, ticket: Ticket) {
        self.queue.borrow_mut().retain(|t| *t != ticket);
    }
}

/// Budget check asked after every unit of work.
pub trait Deadline {
    fn should_yield(&mut self) -> bool;
}

/// Never yields; used by synchronous flushes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn should_yield(&mut self) -> bool {
        false
    }
}

/// Yields after a fixed number of units.
#[derive(Clone, Copy, Debug)]
pub struct StepBudget {
    remaining: usize,
}

impl StepBudget {
    pub fn new(steps: usize) -> Self {
        Self { remaining: steps }
    }
}

impl Deadline for StepBudget {
    fn should_yield(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// Yields once less than a millisecond of the slice is left.
pub struct TimeBudget {
    until: Instant,
    clock: Rc<dyn Clock>,
}

impl TimeBudget {
    const MIN_REMAINING: Duration = Duration::from_millis(1);

    pub fn new(budget: Duration) -> Self {
        Self::with_clock(budget, Rc::new(SystemClock))
    }

    pub fn with_clock(budget: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            until: clock.now() + budget,
            clock,
        }
    }

    pub fn time_remaining(&self) -> Duration {
        self.until.saturating_duration_since(self.clock.now())
    }
}

impl Deadline for TimeBudget {
    fn should_yield(&mut self) -> bool {
        self.time_remaining() < Self::MIN_REMAINING
    }
}

/// Outcome of one drive of the work loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was pending.
    Idle,
    /// The deadline ran out mid-pass; a continuation ticket was requested.
    Yielded,
    /// A pass finished and its mutations were applied.
    Committed,
    /// The ticket was cancelled or superseded; no work was done.
    Stale,
}

/// Cells shared between a root and every setter it handed out.
pub(crate) struct Shared {
    generation: Cell<u64>,
    chained: Cell<bool>,
    in_pass: Cell<bool>,
    abandoned: Cell<bool>,
    next_ticket: Cell<u64>,
    outstanding: Cell<Option<Ticket>>,
    idle: Rc<dyn IdleScheduler>,
}

impl Shared {
    pub(crate) fn new(idle: Rc<dyn IdleScheduler>) -> Rc<Self> {
        Rc::new(Self {
            generation: Cell::new(0),
            chained: Cell::new(false),
            in_pass: Cell::new(false),
            abandoned: Cell::new(false),
            next_ticket: Cell::new(1),
            outstanding: Cell::new(None),
            idle,
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Bumps the generation so the next drive restarts from the root.
    pub(crate) fn request_rerender(&self) {
        self.generation.set(self.generation.get() + 1);
        if self.in_pass.get() {
            self.chained.set(true);
        }
        log::trace!("rerender requested (generation {})", self.generation.get());
        self.schedule();
    }

    /// Cancels the outstanding ticket, then asks the host for a fresh one.
    pub(crate) fn schedule(&self) {
        self.cancel();
        let ticket = Ticket(self.next_ticket.get());
        self.next_ticket.set(ticket.0 + 1);
        self.outstanding.set(Some(ticket));
        self.idle.request_idle(ticket);
    }

    pub(crate) fn cancel(&self) {
        if let Some(t) = self.outstanding.take() {
            self.idle.cancel_idle(t);
        }
    }

    /// True if `ticket` is the outstanding one; it is consumed.
    pub(crate) fn consume(&self, ticket: Ticket) -> bool {
        if self.outstanding.get() == Some(ticket) {
            self.outstanding.set(None);
            true
        } else {
            false
        }
    }

    /// Whether the request being serviced was raised during a pass.
    pub(crate) fn take_chained(&self) -> bool {
        self.chained.replace(false)
    }

    pub(crate) fn take_abandoned(&self) -> bool {
        self.abandoned.replace(false)
    }

    pub(crate) fn enter(self: &Rc<Self>) -> PassGuard {
        self.in_pass.set(true);
        PassGuard(self.clone())
    }
}

/// Marks the root as busy rendering or committing.
///
/// Dropped during unwinding (a component panicked), it flags the in-flight
/// pass as abandoned so the next drive throws the partial tree away.
pub(crate) struct PassGuard(Rc<Shared>);

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.0.in_pass.set(false);
        if std::thread::panicking() {
            self.0.abandoned.set(true);
        }
    }
}

/// Handle that schedules a full rerender of the root it came from.
#[derive(Clone)]
pub struct Updater(Weak<Shared>);

impl Updater {
    pub(crate) fn new(shared: &Rc<Shared>) -> Self {
        Self(Rc::downgrade(shared))
    }

    pub fn request_rerender(&self) {
        match self.0.upgrade() {
            Some(shared) => shared.request_rerender(),
            None => log::debug!("update dropped: root is gone"),
        }
    }

    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Updater").field(&self.is_live()).finish()
    }
}
