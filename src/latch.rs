//! Countdown latch.
//!
//! A [`Latch`] starts at a fixed count; participants call
//! [`Latch::count_down`] once each and waiters block until the count reaches
//! zero. The pool uses one per initialization so that `initialize` returns only
//! after every worker has reached its idle loop.
//!
//! # Examples
//!
//! ```
//! use prometheus_go_pool::Latch;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let latch = Arc::new(Latch::new(3));
//! let handles: Vec<_> = (0..3)
//!     .map(|_| {
//!         let latch = Arc::clone(&latch);
//!         thread::spawn(move || latch.count_down())
//!     })
//!     .collect();
//!
//! latch.wait();
//! assert_eq!(latch.remaining(), 0);
//! # for handle in handles { handle.join().unwrap(); }
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A single-use countdown latch.
#[derive(Debug, Default)]
pub struct Latch {
    remaining: Mutex<usize>,
    released: Condvar,
}

impl Latch {
    /// Creates a latch that opens after `count` calls to `count_down`.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Decrements the count, releasing all waiters when it reaches zero.
    ///
    /// Calls on an already open latch have no effect.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.released.notify_all();
        }
    }

    /// Blocks until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.released.wait(&mut remaining);
        }
    }

    /// Blocks until the count reaches zero or `timeout` elapses.
    ///
    /// Returns `true` if the latch opened.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.released.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }

    /// Returns the number of outstanding `count_down` calls.
    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }
}
