//! The render session.
//!
//! A [`Root`] owns everything one mounted application needs: the host tree,
//! the work-node arena with its committed and in-progress trees, the
//! scheduler cursor and the per-pass deletion and effect lists. Nothing lives
//! in globals, so any number of roots can coexist on one thread.
//!
//! ```rust
//! use fibre_core::*;
//!
//! fn app(cx: &mut Scope<'_>, _props: &Props) -> Element {
//!     let (n, _set_n) = cx.use_state(|| 1);
//!     Some(element("p").child(n))
//! }
//!
//! let idle = ManualScheduler::new();
//! let mut host = MemoryHost::new();
//! let container = host.create_container("body");
//! let mut root = mount(host, container, component(app, Props::new()), idle.clone());
//!
//! while let Some(ticket) = idle.next() {
//!     root.run_idle(ticket, &mut Unbounded).unwrap();
//! }
//! assert_eq!(root.host().inner_markup(container), "<p>1</p>");
//! ```

use std::rc::Rc;

use web_time::Duration;

use crate::commit::{commit_deletion, commit_mutations};
use crate::config::RootConfig;
use crate::effects::PendingEffect;
use crate::error::Error;
use crate::fiber::{DiffTag, Fiber, FiberKey, FiberTree};
use crate::host::HostTree;
use crate::node::Node;
use crate::reconcile::{Pending, perform_unit_of_work};
use crate::scheduler::{
    Deadline, IdleScheduler, Shared, Tick, Ticket, TimeBudget, Unbounded, Updater,
};

/// What one committed pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassStats {
    /// 1-based count of committed passes on this root.
    pub pass: u64,
    /// Work nodes processed, including work thrown away by restarts.
    pub units: usize,
    pub restarts: usize,
    pub yields: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Host-tree calls made by the commit.
    pub mutations: usize,
    pub commit_time: Duration,
}

pub struct Root<H: HostTree> {
    host: H,
    container: H::Node,
    element: Option<Node>,
    fibers: FiberTree<H::Node>,
    current: Option<FiberKey>,
    wip: Option<FiberKey>,
    next_unit: Option<FiberKey>,
    deletions: Vec<FiberKey>,
    effects: Vec<PendingEffect>,
    /// Generation the in-flight (or last) pass was started for.
    generation: u64,
    /// Consecutive passes started by updates raised inside a pass.
    chain: usize,
    shared: Rc<Shared>,
    updater: Updater,
    config: RootConfig,
    stats: PassStats,
    last: Option<PassStats>,
}

/// Mounts `element` into `container` with default settings.
pub fn mount<H: HostTree>(
    host: H,
    container: H::Node,
    element: Node,
    idle: Rc<dyn IdleScheduler>,
) -> Root<H> {
    Root::mount(host, container, element, idle)
}

impl<H: HostTree> Root<H> {
    pub fn mount(host: H, container: H::Node, element: Node, idle: Rc<dyn IdleScheduler>) -> Self {
        Self::with_config(host, container, element, idle, RootConfig::default())
    }

    /// Creates the session and requests the first idle slice for the initial pass.
    pub fn with_config(
        host: H,
        container: H::Node,
        element: Node,
        idle: Rc<dyn IdleScheduler>,
        config: RootConfig,
    ) -> Self {
        let shared = Shared::new(idle);
        let updater = Updater::new(&shared);
        let root = Self {
            host,
            container,
            element: Some(element),
            fibers: FiberTree::new(),
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            effects: Vec::new(),
            generation: shared.generation(),
            chain: 0,
            shared,
            updater,
            config,
            stats: PassStats::default(),
            last: None,
        };
        log::debug!("{}: mounted", root.config.label);
        root.shared.request_rerender();
        root
    }

    /// Replaces the root description and schedules a pass.
    pub fn render(&mut self, element: Node) {
        self.element = Some(element);
        self.shared.request_rerender();
    }

    /// Services an idle callback.
    ///
    /// Tickets other than the outstanding one are ignored and reported as
    /// [`Tick::Stale`]. The pass runs until it completes and commits or the
    /// deadline asks to yield, in which case a continuation is requested.
    pub fn run_idle(&mut self, ticket: Ticket, deadline: &mut dyn Deadline) -> Result<Tick, Error> {
        if !self.shared.consume(ticket) {
            log::trace!("{}: ignoring stale ticket {}", self.config.label, ticket.id());
            return Ok(Tick::Stale);
        }
        self.drive(deadline)
    }

    /// [`run_idle`](Self::run_idle) with a time slice of `config.idle_budget`.
    pub fn tick(&mut self, ticket: Ticket) -> Result<Tick, Error> {
        let clock = self.config.clock.clone();
        let mut budget = TimeBudget::with_clock(self.config.idle_budget, clock);
        self.run_idle(ticket, &mut budget)
    }

    /// Runs passes synchronously until nothing is pending.
    pub fn flush(&mut self) -> Result<(), Error> {
        while self.has_pending_work() {
            self.shared.cancel();
            self.drive(&mut Unbounded)?;
        }
        Ok(())
    }

    pub fn has_pending_work(&self) -> bool {
        self.wip.is_some()
            || (self.element.is_some() && self.shared.generation() != self.generation)
    }

    /// Deletes the committed tree: instances are unmounted, effect cleanups
    /// run and the host nodes are detached from the container.
    pub fn unmount(&mut self) {
        self.abandon_pass();
        self.teardown();
        self.element = None;
        self.generation = self.shared.generation();
        self.shared.cancel();
        log::debug!("{}: unmounted", self.config.label);
    }

    /// Tears the tree down and schedules a fresh mount of the same
    /// description. No state survives.
    pub fn remount(&mut self) -> Result<(), Error> {
        if self.element.is_none() {
            return Err(Error::Unmounted);
        }
        self.abandon_pass();
        self.teardown();
        self.shared.request_rerender();
        Ok(())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> &H::Node {
        &self.container
    }

    /// A handle that schedules a rerender of this root.
    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Statistics of the last committed pass.
    pub fn stats(&self) -> Option<&PassStats> {
        self.last.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    /// Live work nodes across the committed and in-progress trees.
    pub fn work_nodes(&self) -> usize {
        self.fibers.len()
    }

    fn drive(&mut self, deadline: &mut dyn Deadline) -> Result<Tick, Error> {
        let retry = self.shared.take_abandoned();
        if retry {
            log::warn!("{}: discarding a pass interrupted by a panic", self.config.label);
            self.abandon_pass();
        }
        if self.element.is_none() {
            self.generation = self.shared.generation();
            return Ok(Tick::Idle);
        }
        if !retry && self.wip.is_none() && self.shared.generation() == self.generation {
            return Ok(Tick::Idle);
        }

        let guard = self.shared.enter();
        if self.wip.is_none() || self.shared.generation() != self.generation {
            self.begin_pass()?;
        }

        while let Some(unit) = self.next_unit {
            self.next_unit = perform_unit_of_work(
                &mut self.fibers,
                unit,
                Pending {
                    deletions: &mut self.deletions,
                    effects: &mut self.effects,
                    updater: &self.updater,
                },
            );
            self.stats.units += 1;

            if self.shared.generation() != self.generation {
                log::debug!("{}: update during pass, restarting", self.config.label);
                self.begin_pass()?;
                continue;
            }
            if self.next_unit.is_some() && deadline.should_yield() {
                self.stats.yields += 1;
                drop(guard);
                self.shared.schedule();
                return Ok(Tick::Yielded);
            }
        }

        self.commit_pass();
        drop(guard);
        Ok(Tick::Committed)
    }

    /// Starts (or restarts) a pass from the root for the current generation.
    fn begin_pass(&mut self) -> Result<(), Error> {
        let restarting = self.wip.is_some();
        self.abandon_pass();

        self.chain = if self.shared.take_chained() {
            self.chain + 1
        } else {
            0
        };
        self.generation = self.shared.generation();
        if self.chain > self.config.rerender_limit {
            let limit = self.config.rerender_limit;
            self.chain = 0;
            self.shared.cancel();
            log::error!(
                "{}: more than {limit} chained re-renders; giving up on this update",
                self.config.label
            );
            return Err(Error::RenderLoop { limit });
        }
        let Some(element) = self.element.clone() else {
            return Err(Error::Unmounted);
        };

        if restarting {
            self.stats.restarts += 1;
        } else {
            self.stats = PassStats {
                pass: self.last.as_ref().map_or(0, |s| s.pass) + 1,
                ..PassStats::default()
            };
        }

        let root = self
            .fibers
            .insert(Fiber::root(self.container.clone(), element, self.current));
        self.wip = Some(root);
        self.next_unit = Some(root);
        log::trace!(
            "{}: pass {} started (generation {})",
            self.config.label,
            self.stats.pass,
            self.generation
        );
        Ok(())
    }

    /// Drops uncommitted work. The committed tree is untouched.
    fn abandon_pass(&mut self) {
        if let Some(wip) = self.wip.take() {
            self.fibers.remove_subtree(wip);
        }
        self.next_unit = None;
        for key in self.deletions.drain(..) {
            if let Some(fiber) = self.fibers.get_mut(key) {
                fiber.tag = DiffTag::None;
            }
        }
        self.effects.clear();
    }

    fn commit_pass(&mut self) {
        let Some(wip) = self.wip else {
            return;
        };
        let started = self.config.clock.now();
        // The pass stays owned by the session until it is published, so a
        // panicking will_unmount leaves it for abandon_pass to free.
        let report = commit_mutations(
            &mut self.fibers,
            &mut self.host,
            wip,
            &self.deletions,
        );

        // Publish before any user callback runs, so a panicking effect still
        // leaves a consistent baseline behind.
        self.wip = None;
        self.deletions.clear();
        if let Some(old) = self.current.replace(wip) {
            self.fibers.remove_subtree(old);
        }
        for key in self.fibers.preorder(wip) {
            let fiber = &mut self.fibers[key];
            fiber.tag = DiffTag::None;
            fiber.alternate = None;
        }
        self.next_unit = None;

        for effect in std::mem::take(&mut self.effects) {
            effect.flush();
        }
        for call in report.lifecycle {
            call.run();
        }

        self.stats.inserted = report.inserted;
        self.stats.updated = report.updated;
        self.stats.deleted = report.deleted;
        self.stats.mutations = report.mutations;
        self.stats.commit_time = self.config.clock.now().saturating_duration_since(started);
        log::debug!(
            "{}: pass {} committed ({} units, {} mutations, {:?})",
            self.config.label,
            self.stats.pass,
            self.stats.units,
            self.stats.mutations,
            self.stats.commit_time
        );
        self.last = Some(std::mem::take(&mut self.stats));
    }

    fn teardown(&mut self) {
        let Some(root) = self.current.take() else {
            return;
        };
        {
            let _guard = self.shared.enter();
            for child in self.fibers.children(root) {
                commit_deletion(&mut self.fibers, &mut self.host, child);
            }
        }
        self.shared.take_chained();
        self.fibers.remove_subtree(root);
    }

    /// Kinds and tags of the in-progress tree, root excluded, in walk order.
    #[cfg(test)]
    pub(crate) fn pending_diff(&self) -> Vec<(String, DiffTag)> {
        let Some(wip) = self.wip else {
            return Vec::new();
        };
        self.fibers
            .preorder(wip)
            .into_iter()
            .skip(1)
            .map(|k| (format!("{:?}", self.fibers[k].kind), self.fibers[k].tag))
            .collect()
    }
}
