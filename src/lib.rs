//! # Prometheus Go Pool
//!
//! A fixed-capacity worker thread pool for fork/join style concurrency.
//!
//! The pool pre-spawns a bounded set of OS threads that park on a counting
//! semaphore. Each accepted task releases exactly one permit; the woken worker
//! claims one task from the shared task store, runs it to completion and
//! reports back to the quiescence tracker. Callers fork work with
//! [`WorkerPool::submit`] and join with [`WorkerPool::wait_idle`].
//!
//! ## Key Features
//!
//! - **Owned handles**: every pool is an explicit value; independent pools coexist
//! - **Immediate backpressure**: submissions beyond capacity are rejected, never queued
//! - **No polling**: startup uses a latch, workers park on a semaphore, joins use a condvar
//! - **Restartable**: `shutdown` returns the handle to its uninitialized state
//! - **Distinct failure kinds**: every failure surfaces as an inspectable [`PoolError`]
//!
//! ## Example
//!
//! ```rust
//! use prometheus_go_pool::{WorkerPool, WorkerPoolConfig};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), prometheus_go_pool::PoolError> {
//! let pool = WorkerPool::start(
//!     WorkerPoolConfig::new()
//!         .with_worker_count(4)
//!         .with_queue_capacity(16),
//! )?;
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! for _ in 0..16 {
//!     let hits = Arc::clone(&hits);
//!     pool.submit(move || {
//!         hits.fetch_add(1, Ordering::Relaxed);
//!     })?;
//! }
//!
//! pool.wait_idle();
//! assert_eq!(hits.load(Ordering::Relaxed), 16);
//!
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Caller Responsibilities
//!
//! A task must never call [`WorkerPool::shutdown`] or [`WorkerPool::wait_idle`]
//! on the pool it runs in: the first would join its own thread, the second
//! waits for a counter that includes the calling task.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core pool, task store, and quiescence tracking.
pub mod core;
/// Configuration models for worker pools.
pub mod config;
/// Builders to construct named pools from configuration.
pub mod builders;
/// Counting semaphore used to wake workers.
pub mod semaphore;
/// Single-use countdown latch used as the startup rendezvous.
pub mod latch;
/// Shared utilities.
pub mod util;

pub use crate::config::{PoolSetConfig, TaskOrder, WorkerPoolConfig};
pub use crate::core::{
    AppResult, BoxedTask, ErrorKind, PoolError, PoolState, PoolStats, Task, WorkerPool,
};
pub use crate::latch::Latch;
pub use crate::semaphore::Semaphore;
