//! Cancellable trailing-edge debounce timer
//!
//! Wraps the spawn-a-sleep pattern so that callers get the three guarantees
//! the preference writer needs: rescheduling replaces the pending job,
//! `flush` runs the pending job immediately, and dropping the debouncer
//! cancels whatever is still pending. Must be used from within a tokio
//! runtime.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A trailing-edge debouncer: only the most recently scheduled job runs,
/// after the configured quiet period.
pub struct Debouncer {
    delay: Duration,
    inner: Arc<Inner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    // Sequence number of the currently pending job; a timer only fires the
    // job it was scheduled for.
    seq: AtomicU64,
    pending: Mutex<Option<(u64, Job)>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Arc::new(Inner {
                seq: AtomicU64::new(0),
                pending: Mutex::new(None),
            }),
            timer: Mutex::new(None),
        }
    }

    /// The configured quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `job` to run after the quiet period, replacing any job that
    /// is still pending
    pub fn call<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.pending.lock() = Some((id, Box::new(job)));

        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let job = {
                let mut pending = inner.pending.lock();
                match pending.take() {
                    Some((pending_id, job)) if pending_id == id => Some(job),
                    other => {
                        // A newer job superseded this timer; put it back.
                        *pending = other;
                        None
                    }
                }
            };
            if let Some(job) = job {
                job();
            }
        });

        if let Some(old) = self.timer.lock().replace(handle) {
            old.abort();
        }
    }

    /// Run the pending job immediately, if any
    pub fn flush(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
        let job = self.inner.pending.lock().take();
        if let Some((_, job)) = job {
            job();
        }
    }

    /// Drop the pending job without running it
    pub fn cancel(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
        self.inner.pending.lock().take();
    }

    /// Whether a job is currently pending
    pub fn is_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
