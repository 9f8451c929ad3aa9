pub use crate::component::{RenderPtr, Stateful, This};
pub use crate::config::RootConfig;
pub use crate::effects::{Dispose, on_cleanup};
pub use crate::error::Error;
pub use crate::hooks::{Ref, Scope, Setter};
pub use crate::host::HostTree;
pub use crate::memory::{HostId, MemoryHost};
pub use crate::node::{
    Element, Node, NodeRef, Props, Value, component, create_element, create_ref, element, fragment,
    stateful, text,
};
pub use crate::runtime::{PassStats, Root, mount};
pub use crate::scheduler::{Deadline, IdleScheduler, ManualScheduler, StepBudget, Tick, Unbounded};
