//! Periodic refresh scheduling
//!
//! A single worker thread sleeps on a condvar deadline and calls
//! `IndexManager::refresh` on each tick. Cancellation is cooperative and
//! immediate: the cancel flag is checked before every refresh, so no extra
//! run is queued after `cancel()`. A refresh already in flight at cancel
//! time finishes but is not rescheduled.

use crate::lifecycle::IndexManager;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error};

struct RefreshShared {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    tick: Condvar,
}

/// Handle to a running periodic-refresh worker
///
/// Dropping the handle cancels the worker and joins it.
pub struct RefreshHandle {
    shared: Arc<RefreshShared>,
    worker: Option<JoinHandle<()>>,
}

/// Start refreshing `manager` every `interval` until cancelled
pub fn schedule_periodic_refresh(
    manager: Arc<IndexManager>,
    interval: Duration,
) -> RefreshHandle {
    let shared = Arc::new(RefreshShared {
        cancelled: AtomicBool::new(false),
        lock: Mutex::new(()),
        tick: Condvar::new(),
    });

    let worker_shared = Arc::clone(&shared);
    let worker = std::thread::Builder::new()
        .name("muster-refresh".to_string())
        .spawn(move || refresh_loop(&worker_shared, &manager, interval))
        .expect("failed to spawn refresh worker thread");

    RefreshHandle {
        shared,
        worker: Some(worker),
    }
}

fn refresh_loop(shared: &RefreshShared, manager: &IndexManager, interval: Duration) {
    loop {
        {
            let mut guard = shared.lock.lock();
            let deadline = Instant::now() + interval;
            // Sleep to the deadline; spurious wakeups and cancel notifications
            // both land here
            while !shared.cancelled.load(Ordering::Acquire) {
                if shared.tick.wait_until(&mut guard, deadline).timed_out() {
                    break;
                }
            }
        }

        if shared.cancelled.load(Ordering::Acquire) {
            debug!("periodic refresh cancelled");
            return;
        }

        if let Err(err) = manager.refresh() {
            error!(error = %err, "scheduled refresh failed, keeping previous snapshot");
        }
    }
}

impl RefreshHandle {
    /// Cancel the worker and wait for it to exit
    pub fn cancel(mut self) {
        self.cancel_inner();
    }

    /// True once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    fn cancel_inner(&mut self) {
        self.shared.cancelled.store(true, Ordering::Release);

        // Lock before notifying to prevent lost-wakeup: the worker holds this
        // lock between its cancel check and the condvar wait, so acquiring it
        // guarantees the worker is either already waiting (and our notify
        // wakes it) or has not checked the flag yet (and will see it set).
        {
            let _guard = self.shared.lock.lock();
            self.shared.tick.notify_all();
        }

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel_inner();
    }
}
