//! Worker pool with a fixed set of dedicated OS threads.
//!
//! This module provides a `WorkerPool` that dispatches caller-supplied tasks
//! to pre-spawned worker threads. Each worker parks on a counting semaphore,
//! claims one task from the shared [`TaskStore`] per wake-up, runs it, and
//! reports completion to the [`InFlight`] tracker.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Running --shutdown--> ShuttingDown --> Uninitialized
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use prometheus_go_pool::{WorkerPool, WorkerPoolConfig};
//!
//! let pool = WorkerPool::start(WorkerPoolConfig::new().with_worker_count(4))?;
//! pool.submit(|| expensive_step())?;
//! pool.wait_idle();
//! pool.shutdown()?;
//! ```

mod native;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::WorkerPoolConfig;
use crate::core::in_flight::InFlight;
use crate::core::task::TaskStore;
use crate::core::PoolError;
use crate::semaphore::Semaphore;

pub use native::WorkerPool;

/// Lifecycle state of a pool handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// No workers exist; `initialize` may be called.
    Uninitialized,
    /// Workers are parked or executing; tasks are accepted.
    Running,
    /// Shutdown has begun; new tasks are rejected while workers drain and exit.
    ShuttingDown,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
        };
        f.write_str(name)
    }
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,

    /// Maximum number of tasks in flight at once.
    pub capacity: usize,

    /// Tasks accepted but not yet finished.
    pub in_flight: usize,

    /// Tasks accepted but not yet claimed by a worker.
    pub queued: usize,

    /// Total tasks accepted.
    pub submitted_tasks: u64,

    /// Total tasks that ran to completion.
    pub completed_tasks: u64,

    /// Total submissions rejected.
    pub rejected_tasks: u64,

    /// Total tasks that panicked.
    pub panicked_tasks: u64,
}

/// Internal counters for pool statistics (thread-safe).
///
/// Owned by the handle, so totals survive a shutdown and restart.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub rejected_tasks: AtomicU64,
    pub panicked_tasks: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(
        &self,
        worker_count: usize,
        capacity: usize,
        in_flight: usize,
        queued: usize,
    ) -> PoolStats {
        PoolStats {
            worker_count,
            capacity,
            in_flight,
            queued,
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            rejected_tasks: self.rejected_tasks.load(Ordering::Relaxed),
            panicked_tasks: self.panicked_tasks.load(Ordering::Relaxed),
        }
    }
}

/// State shared between a running pool handle and its workers.
///
/// A fresh instance is built by every `initialize`, so nothing from a previous
/// run leaks into the next.
#[derive(Debug)]
pub(crate) struct PoolShared {
    /// Identifier of the owning handle, attached to every log line.
    pub pool_id: Uuid,
    /// Pending tasks.
    pub store: TaskStore,
    /// One permit per accepted task plus one per worker at shutdown.
    pub signal: Semaphore,
    /// Accepted-but-unfinished tasks.
    pub in_flight: InFlight,
    /// Set once by shutdown; read by workers after each wake-up.
    pub quit: AtomicBool,
    /// Handle-owned statistics.
    pub counters: Arc<PoolCounters>,
}

impl PoolShared {
    pub fn new(
        pool_id: Uuid,
        config: &WorkerPoolConfig,
        counters: Arc<PoolCounters>,
    ) -> Result<Self, PoolError> {
        Ok(Self {
            pool_id,
            store: TaskStore::with_capacity(config.effective_capacity(), config.task_order)?,
            signal: Semaphore::new(0),
            in_flight: InFlight::new(),
            quit: AtomicBool::new(false),
            counters,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }
}
