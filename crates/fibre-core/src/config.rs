use std::fmt;
use std::rc::Rc;

use web_time::Duration;

use crate::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct RootConfig {
    /// Passes restarted by updates raised inside passes before giving up.
    pub rerender_limit: usize,
    /// Slice length [`Root::tick`](crate::Root::tick) works for before yielding.
    pub idle_budget: Duration,
    /// Shown in log lines to tell roots apart.
    pub label: String,
    /// Time source for idle slices and commit timing.
    pub clock: Rc<dyn Clock>,
}

impl fmt::Debug for RootConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootConfig")
            .field("rerender_limit", &self.rerender_limit)
            .field("idle_budget", &self.idle_budget)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            rerender_limit: 100,
            idle_budget: Duration::from_millis(8),
            label: "root".to_string(),
            clock: Rc::new(SystemClock),
        }
    }
}

impl RootConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rerender_limit(mut self, limit: usize) -> Self {
        self.rerender_limit = limit;
        self
    }

    pub fn idle_budget(mut self, budget: Duration) -> Self {
        self.idle_budget = budget;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }
}
