//! Counting semaphore implementation.
//!
//! Workers park on a [`Semaphore`] until a permit is released to them. One
//! permit is released per accepted task and one per worker at shutdown, so the
//! permit count is the number of wake-ups owed to the worker set.
//!
//! Built on `parking_lot`'s mutex and condition variable: no poisoning, no
//! spinning.
//!
//! # Examples
//!
//! ```
//! use prometheus_go_pool::Semaphore;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let sem = Arc::new(Semaphore::new(0));
//! let sem2 = Arc::clone(&sem);
//!
//! let waiter = thread::spawn(move || {
//!     sem2.acquire();
//! });
//!
//! sem.release(1).unwrap();
//! waiter.join().unwrap();
//! assert_eq!(sem.available(), 0);
//! ```

use parking_lot::{Condvar, Mutex};

use crate::core::PoolError;

/// A counting semaphore.
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    #[must_use]
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Takes a permit if one is available without blocking.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Adds `n` permits and wakes up to `n` blocked waiters.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::SignalReleaseFailed` if the permit count would
    /// overflow. The count is left unchanged in that case.
    pub fn release(&self, n: usize) -> Result<(), PoolError> {
        if n == 0 {
            return Ok(());
        }

        let mut permits = self.permits.lock();
        *permits = permits
            .checked_add(n)
            .ok_or(PoolError::SignalReleaseFailed { requested: n })?;
        drop(permits);

        if n == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
        Ok(())
    }

    /// Returns the number of permits currently available.
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_try_acquire_empty() {
        let sem = Semaphore::new(0);
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_try_acquire_counts_down() {
        let sem = Semaphore::new(2);
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_release_zero_is_noop() {
        let sem = Semaphore::new(3);
        sem.release(0).unwrap();
        assert_eq!(sem.available(), 3);
    }

    #[test]
    fn test_release_overflow_rejected() {
        let sem = Semaphore::new(usize::MAX);
        let err = sem.release(1).unwrap_err();
        assert!(matches!(err, PoolError::SignalReleaseFailed { requested: 1 }));
        assert_eq!(sem.available(), usize::MAX);
    }

    #[test]
    fn test_release_many_wakes_all() {
        let sem = Arc::new(Semaphore::new(0));
        let woken = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..4 {
            let sem = Arc::clone(&sem);
            let woken = Arc::clone(&woken);
            handles.push(thread::spawn(move || {
                sem.acquire();
                woken.fetch_add(1, Ordering::SeqCst);
            }));
        }

        thread::sleep(Duration::from_millis(20));
        assert_eq!(woken.load(Ordering::SeqCst), 0);

        sem.release(4).unwrap();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(woken.load(Ordering::SeqCst), 4);
        assert_eq!(sem.available(), 0);
    }
}
