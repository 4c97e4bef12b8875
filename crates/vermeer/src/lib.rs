//! Vermeer - community-space snapshot capture and restore
//!
//! Vermeer captures a point-in-time snapshot of a collaborative community
//! space — profile settings, roles, channel hierarchy with messages and
//! threads, emojis, bans, members, auto-moderation rules — into a portable
//! document, and later reconstructs an equivalent space from that document
//! against a target instance.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vermeer::{
//!     build_scheduler, CaptureOptions, RestoreOptions, RestoreOrchestrator, SnapshotCapture,
//! };
//!
//! # async fn demo(
//! #     directory: &impl vermeer::RemoteDirectory,
//! #     media: &impl vermeer::MediaFetcher,
//! # ) -> vermeer::VermeerResult<()> {
//! let options = CaptureOptions::default();
//! let scheduler = build_scheduler(*options.speed_ms(), *options.verbose());
//! let snapshot = SnapshotCapture::new(directory, media, &scheduler, options)
//!     .run()
//!     .await?;
//!
//! let options = RestoreOptions::default();
//! let scheduler = build_scheduler(*options.speed_ms(), *options.verbose());
//! let report = RestoreOrchestrator::new(directory, &scheduler, options)
//!     .run(&snapshot)
//!     .await?;
//! println!("created {} channels", report.channels_created);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Vermeer is organized as a workspace with focused crates:
//!
//! - `vermeer_error` - Error types
//! - `vermeer_core` - Snapshot document model and configuration
//! - `vermeer_interface` - RemoteDirectory trait seam and live views
//! - `vermeer_rate_limit` - The rate-limited call scheduler
//! - `vermeer_storage` - Snapshot document persistence
//!
//! This crate (`vermeer`) holds the engine — capture, the restore phase
//! state machine, message replay — and re-exports everything for
//! convenience.
//!
//! # Concurrency model
//!
//! One [`Scheduler`] is instantiated per capture-or-restore invocation and
//! passed to every sub-operation; all remote reads and writes funnel
//! through it with strict one-in-flight, minimum-delay dispatch. A few
//! restore phases issue their calls concurrently purely to shorten
//! wall-clock time; the scheduler still serializes the underlying calls.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capture;
mod media;
mod remap;
mod replay;
pub mod resolve;
mod restore;

pub use capture::SnapshotCapture;
pub use media::HttpMediaFetcher;
pub use remap::RemapTable;
pub use replay::{MessageReplay, ReplayOutcome};
pub use restore::{RestoreOrchestrator, RestoreReport};

// Re-export the workspace crates
pub use vermeer_core::*;
pub use vermeer_error::*;
pub use vermeer_interface::*;
pub use vermeer_rate_limit::*;
pub use vermeer_storage::*;

use std::sync::Arc;

/// Build a scheduler from the `speed_ms` and `verbose` options.
///
/// Verbose runs get a [`TracingObserver`] that logs every dispatch event.
pub fn build_scheduler(speed_ms: u64, verbose: bool) -> Scheduler {
    let scheduler = Scheduler::from_speed_ms(speed_ms);
    if verbose {
        scheduler.with_observer(Arc::new(TracingObserver))
    } else {
        scheduler
    }
}
