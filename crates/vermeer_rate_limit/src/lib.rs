//! Rate-limited call scheduling.
//!
//! Every remote call in a capture or restore run funnels through one
//! [`Scheduler`]: a FIFO with exactly one unit of work in flight and a
//! configurable minimum delay between successive dispatches. This models
//! the remote backend's global rate limit, which is the only shared
//! mutable resource in the system.
//!
//! One scheduler is instantiated per capture-or-restore invocation and
//! passed explicitly to every sub-operation — one serialization domain per
//! run, no global singleton.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observer;
mod scheduler;

pub use observer::{DispatchObserver, TracingObserver};
pub use scheduler::Scheduler;
