//! Dispatch event observers.

use tracing::{error, info};
use vermeer_error::VermeerError;

/// Observer hooks for scheduler dispatch events.
///
/// All hooks default to no-ops; implement only the events of interest.
/// Hooks run synchronously on the dispatch path and must not block.
pub trait DispatchObserver: Send + Sync {
    /// A unit of work is about to run.
    fn on_executing(&self, _job_id: &str) {}

    /// A unit of work completed successfully.
    fn on_done(&self, _job_id: &str) {}

    /// A unit of work failed. The failure is still returned to the caller;
    /// this hook is purely observational.
    fn on_failed(&self, _job_id: &str, _error: &VermeerError) {}
}

/// Observer that logs dispatch events through `tracing`.
///
/// Attached when verbose dispatch logging is enabled. Oversize-payload
/// failures are not logged — that failure class is handled silently by
/// message replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_executing(&self, job_id: &str) {
        info!(job_id, "Executing");
    }

    fn on_done(&self, job_id: &str) {
        info!(job_id, "Completed");
    }

    fn on_failed(&self, job_id: &str, error: &VermeerError) {
        if error.is_oversize_payload() {
            return;
        }
        error!(job_id, error = %error, "Job failed");
    }
}
