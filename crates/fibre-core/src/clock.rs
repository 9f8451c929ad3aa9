//! Time sources for idle budgets and commit timing.
//!
//! Each root reads time through the [`Clock`] in its
//! [`RootConfig`](crate::RootConfig), so tests can make slices expire
//! exactly where they want.

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Stands still until told to move. Clones share one reading.
#[derive(Clone)]
pub struct TestClock {
    t: Rc<Cell<Instant>>,
}

impl TestClock {
    pub fn new(start: Instant) -> Self {
        Self {
            t: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.t.set(self.t.get() + by);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
}

/// Moves forward by `step` every time it is read.
pub struct SteppingClock {
    start: Instant,
    step: Duration,
    reads: Cell<u32>,
}

impl SteppingClock {
    pub fn new(start: Instant, step: Duration) -> Self {
        Self {
            start,
            step,
            reads: Cell::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        let n = self.reads.get();
        self.reads.set(n.saturating_add(1));
        self.start + self.step * n
    }
}
