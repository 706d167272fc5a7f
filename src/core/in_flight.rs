//! In-flight accounting and the quiescence condition.
//!
//! A task counts as in flight from the moment its submission is accepted until
//! its worker finishes running it. The count is raised on the submitting
//! thread, before any worker is woken, so a waiter can never observe a false
//! idle state for a task that has been accepted but not yet claimed.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Counter of accepted-but-unfinished tasks with an idle condition.
#[derive(Debug, Default)]
pub struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    /// Create a tracker with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more task unless `limit` tasks are already in flight.
    ///
    /// Returns `false` when the limit is reached.
    pub fn try_begin(&self, limit: usize) -> bool {
        let mut count = self.count.lock();
        if *count >= limit {
            return false;
        }
        *count += 1;
        true
    }

    /// Mark one task finished, waking every idle waiter on the last one.
    pub fn finish(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    /// Block until nothing is in flight.
    ///
    /// Returns immediately when the count is already zero.
    pub fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }

    /// Block until nothing is in flight or `timeout` elapses.
    ///
    /// Returns `true` if the tracker became idle.
    pub fn wait_idle_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count > 0 {
            if self.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }

    /// Current number of tasks in flight.
    pub fn current(&self) -> usize {
        *self.count.lock()
    }

    /// Force the count to zero and release every waiter.
    ///
    /// Only used at teardown, once no worker can finish a task anymore.
    pub fn reset(&self) {
        let mut count = self.count.lock();
        *count = 0;
        self.idle.notify_all();
    }
}
