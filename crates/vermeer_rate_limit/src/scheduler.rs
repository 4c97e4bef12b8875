//! The rate-limited call scheduler.

use crate::DispatchObserver;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use vermeer_error::VermeerResult;

/// Serializes units of work through one FIFO with a minimum delay between
/// successive dispatches and exactly one unit in flight at a time.
///
/// Callers from any number of concurrent phases share the same queue; the
/// scheduler admits them in arrival order. A failed unit of work does not
/// stop the queue — the failure is returned to its caller and the next
/// unit dispatches normally.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vermeer_rate_limit::Scheduler;
///
/// # async fn demo() -> vermeer_error::VermeerResult<()> {
/// let scheduler = Scheduler::new(Duration::from_millis(250));
/// let value = scheduler.schedule("demo::fetch", async { Ok(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    min_delay: Duration,
    /// Earliest instant the next dispatch may start. Holding the lock
    /// across the unit of work is what enforces one-in-flight.
    slot: Mutex<Option<Instant>>,
    observers: Vec<Arc<dyn DispatchObserver>>,
}

impl Scheduler {
    /// Create a scheduler with the given minimum inter-dispatch delay.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            slot: Mutex::new(None),
            observers: Vec::new(),
        }
    }

    /// Create a scheduler from a delay in milliseconds, the unit used by
    /// the `speed_ms` option.
    pub fn from_speed_ms(speed_ms: u64) -> Self {
        Self::new(Duration::from_millis(speed_ms))
    }

    /// Attach a dispatch observer.
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The configured minimum inter-dispatch delay.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Run `work` when its turn in the queue comes up.
    ///
    /// `job_id` is diagnostic only — it is handed to observers and log
    /// events, never used for deduplication; identical ids may be
    /// scheduled any number of times.
    ///
    /// # Errors
    ///
    /// Returns the unit of work's own failure, untouched.
    pub async fn schedule<T, F>(&self, job_id: impl Into<String>, work: F) -> VermeerResult<T>
    where
        F: Future<Output = VermeerResult<T>> + Send,
        T: Send,
    {
        let job_id = job_id.into();

        // The tokio mutex queues waiters in arrival order, which gives the
        // FIFO guarantee.
        let mut slot = self.slot.lock().await;
        if let Some(ready_at) = *slot {
            tokio::time::sleep_until(ready_at).await;
        }
        *slot = Some(Instant::now() + self.min_delay);

        for observer in &self.observers {
            observer.on_executing(&job_id);
        }
        debug!(job_id = %job_id, "Dispatching unit of work");

        let result = work.await;

        match &result {
            Ok(_) => {
                for observer in &self.observers {
                    observer.on_done(&job_id);
                }
            }
            Err(error) => {
                for observer in &self.observers {
                    observer.on_failed(&job_id, error);
                }
            }
        }

        result
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("min_delay", &self.min_delay)
            .field("observers", &self.observers.len())
            .finish()
    }
}
