//! # Fibre
//!
//! A small UI runtime that keeps a mutable host tree in sync with a
//! description rebuilt from scratch on every state change. The pieces:
//!
//! - **Descriptions** ([`Node`], [`element`], [`component`], ...): immutable,
//!   cheap to clone, thrown away after each pass.
//! - **Components**: plain functions with hooks, or [`Stateful`] types with
//!   an instance and lifecycle callbacks.
//! - **Reconciler**: builds a work-in-progress tree next to the committed one,
//!   one work node per step, matching children by position and kind.
//! - **Scheduler**: the session does a bounded amount of work per idle
//!   slice and yields back to the host in between.
//! - **Committer**: applies the whole difference to the [`HostTree`] in one
//!   go, then runs effects and lifecycle callbacks.
//!
//! ## Mounting
//!
//! ```rust
//! use fibre_core::*;
//!
//! fn counter(cx: &mut Scope<'_>, props: &Props) -> Element {
//!     let start = props.int("start").unwrap_or(0);
//!     let (count, set_count) = cx.use_state(|| start);
//!     Some(
//!         element("button")
//!             .attr("class", "counter")
//!             .on("click", move || set_count.update(|c| c + 1))
//!             .child(format!("Clicked {count} times")),
//!     )
//! }
//!
//! let idle = ManualScheduler::new();
//! let mut host = MemoryHost::new();
//! let body = host.create_container("body");
//! let mut root = mount(
//!     host,
//!     body,
//!     component(counter, Props::new().with("start", 2)),
//!     idle.clone(),
//! );
//! root.flush().unwrap();
//!
//! let button = root.host().find(body, "button").unwrap();
//! root.host().dispatch(button, "click");
//! root.flush().unwrap();
//! assert_eq!(
//!     root.host().inner_markup(body),
//!     r#"<button class="counter">Clicked 3 times</button>"#
//! );
//! ```
//!
//! ## Driving passes
//!
//! Every state change asks the [`IdleScheduler`] for a callback and the host
//! answers with [`Root::run_idle`] (or [`Root::tick`], which works for
//! `RootConfig::idle_budget` before yielding). A pass that runs out of budget
//! returns [`Tick::Yielded`] and asks for another slice; the host tree is
//! only touched once the pass is complete. [`Root::flush`] runs everything
//! synchronously.
//!
//! An update issued while a pass is in flight restarts it from the root. If
//! updates keep arriving from inside passes (an effect that always sets
//! state, say) the root gives up after `rerender_limit` restarts with
//! [`Error::RenderLoop`].
//!
//! ## Matching
//!
//! Children are matched purely by index and kind. Reordering a list of
//! same-kind children patches each position in place; there are no keys.

pub mod clock;
mod commit;
pub mod component;
pub mod config;
pub mod effects;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod memory;
pub mod node;
pub mod prelude;
mod reconcile;
pub mod runtime;
pub mod scheduler;
mod tests;

pub use clock::*;
pub use component::{Component, RenderPtr, Stateful, This};
pub use config::*;
pub use effects::{Dispose, on_cleanup};
pub use error::*;
pub use fiber::DiffTag;
pub use hooks::{Ref, Scope, Setter};
pub use host::*;
pub use memory::*;
pub use node::*;
pub use runtime::*;
pub use scheduler::{
    Deadline, IdleScheduler, ManualScheduler, StepBudget, Tick, Ticket, TimeBudget, Unbounded,
    Updater,
};
