//! Native implementation of `WorkerPool` using OS threads.
//!
//! # Design Principles
//!
//! - **No polling**: workers park on a semaphore, startup waits on a latch,
//!   idle waiters block on a condvar
//! - **Short critical sections**: the store lock and the in-flight lock are
//!   never held together and never held while a task runs
//! - **Drain on shutdown**: every accepted task runs before its worker exits

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::WorkerPoolConfig;
use crate::core::task::BoxedTask;
use crate::core::PoolError;
use crate::latch::Latch;

use super::{PoolCounters, PoolShared, PoolState, PoolStats};

/// Workers and shared state of a live pool.
struct Running {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

enum Lifecycle {
    Uninitialized,
    Running(Running),
    ShuttingDown(Arc<PoolShared>),
}

impl Lifecycle {
    const fn state(&self) -> PoolState {
        match self {
            Self::Uninitialized => PoolState::Uninitialized,
            Self::Running(_) => PoolState::Running,
            Self::ShuttingDown(_) => PoolState::ShuttingDown,
        }
    }

    fn shared(&self) -> Option<&Arc<PoolShared>> {
        match self {
            Self::Uninitialized => None,
            Self::Running(running) => Some(&running.shared),
            Self::ShuttingDown(shared) => Some(shared),
        }
    }
}

/// Fixed-capacity worker pool with dedicated OS threads.
///
/// The handle is created uninitialized by [`WorkerPool::new`] (or started in
/// one step by [`WorkerPool::start`]). After a successful
/// [`shutdown`](WorkerPool::shutdown) it may be initialized again.
///
/// # Caller Responsibilities
///
/// Tasks must not call `shutdown` or `wait_idle` on the pool that runs them.
/// A task that blocks occupies its worker until it returns.
pub struct WorkerPool {
    /// Identifier attached to this handle's log lines.
    id: Uuid,

    /// Pool configuration.
    config: WorkerPoolConfig,

    /// Statistics shared with every run of this handle.
    counters: Arc<PoolCounters>,

    /// Current lifecycle. Submissions take the read side; state changes take
    /// the write side only for the transition itself.
    lifecycle: RwLock<Lifecycle>,
}

impl WorkerPool {
    /// Create an uninitialized pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            counters: Arc::new(PoolCounters::default()),
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
        })
    }

    /// Create a pool and initialize it.
    ///
    /// # Errors
    ///
    /// Any error of [`WorkerPool::new`] or [`WorkerPool::initialize`].
    pub fn start(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        let pool = Self::new(config)?;
        pool.initialize()?;
        Ok(pool)
    }

    /// Spawn the workers and wait until every one of them is idle.
    ///
    /// Returns the number of workers spawned.
    ///
    /// # Errors
    ///
    /// - `PoolError::AlreadyRunning` if the pool is running or shutting down
    /// - `PoolError::ResourceAllocationFailed` if the task store or worker
    ///   table cannot be allocated
    /// - `PoolError::ThreadSpawnFailed` if a worker cannot be spawned; workers
    ///   spawned before the failure are stopped and joined first
    pub fn initialize(&self) -> Result<usize, PoolError> {
        let mut lifecycle = self.lifecycle.write();
        if !matches!(*lifecycle, Lifecycle::Uninitialized) {
            return Err(PoolError::AlreadyRunning);
        }

        let worker_count = self.config.worker_count;
        let shared = Arc::new(PoolShared::new(
            self.id,
            &self.config,
            Arc::clone(&self.counters),
        )?);

        let mut workers = Vec::new();
        workers.try_reserve_exact(worker_count).map_err(|e| {
            PoolError::ResourceAllocationFailed(format!("worker table for {worker_count} threads: {e}"))
        })?;

        let startup = Arc::new(Latch::new(worker_count));
        for worker_id in 0..worker_count {
            match spawn_worker(worker_id, &self.config, Arc::clone(&shared), Arc::clone(&startup)) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    error!(
                        pool_id = %self.id,
                        worker_id = worker_id,
                        error = %source,
                        "Failed to spawn worker thread"
                    );
                    abort_startup(&shared, workers);
                    return Err(PoolError::ThreadSpawnFailed { worker_id, source });
                }
            }
        }

        startup.wait();

        info!(
            pool_id = %self.id,
            worker_count = worker_count,
            capacity = shared.store.capacity(),
            order = ?shared.store.order(),
            "WorkerPool initialized"
        );

        *lifecycle = Lifecycle::Running(Running { shared, workers });
        Ok(worker_count)
    }

    /// Submit a closure for execution on a worker.
    ///
    /// Never blocks waiting for a free worker.
    ///
    /// # Errors
    ///
    /// - `PoolError::NotInitialized` if the pool is not running
    /// - `PoolError::QueueFull` if `capacity` tasks are already in flight
    /// - `PoolError::SignalReleaseFailed` if no worker could be signalled
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_boxed(Box::new(task))
    }

    /// Submit an already boxed [`Task`](crate::Task).
    ///
    /// The task counts as in flight before this call returns, so a
    /// subsequent [`wait_idle`](WorkerPool::wait_idle) always waits for it.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::submit`].
    pub fn submit_boxed(&self, task: BoxedTask) -> Result<(), PoolError> {
        let lifecycle = self.lifecycle.read();
        let Lifecycle::Running(running) = &*lifecycle else {
            self.counters.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::NotInitialized);
        };
        let shared = &running.shared;

        let capacity = shared.store.capacity();
        if !shared.in_flight.try_begin(capacity) {
            self.counters.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            warn!(pool_id = %self.id, capacity = capacity, "Worker pool queue is full");
            return Err(PoolError::QueueFull { capacity });
        }

        if let Err(err) = shared.store.push(task) {
            shared.in_flight.finish();
            self.counters.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            warn!(pool_id = %self.id, error = %err, "Task store rejected task");
            return Err(err);
        }

        // The task is stored and counted; it runs as soon as any permit wakes a worker.
        if let Err(err) = shared.signal.release(1) {
            drop(shared.store.pop_newest());
            shared.in_flight.finish();
            self.counters.rejected_tasks.fetch_add(1, Ordering::Relaxed);
            error!(pool_id = %self.id, error = %err, "Failed to signal a worker; task withdrawn");
            return Err(err);
        }

        self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
        debug!(pool_id = %self.id, "Task submitted to worker pool");
        Ok(())
    }

    /// Block until every accepted task has finished.
    ///
    /// Returns immediately when nothing is in flight or the pool is not running.
    pub fn wait_idle(&self) {
        if let Some(shared) = self.shared() {
            shared.in_flight.wait_idle();
        }
    }

    /// Block until every accepted task has finished or `timeout` elapses.
    ///
    /// Returns `true` if the pool became idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        self.shared()
            .is_none_or(|shared| shared.in_flight.wait_idle_for(timeout))
    }

    /// Wait for quiescence from an async context.
    ///
    /// The blocking wait runs on tokio's blocking thread pool.
    #[cfg(feature = "tokio-runtime")]
    pub async fn wait_idle_async(&self) {
        let Some(shared) = self.shared() else {
            return;
        };

        if let Err(e) = tokio::task::spawn_blocking(move || shared.in_flight.wait_idle()).await {
            warn!(pool_id = %self.id, error = %e, "Idle wait was interrupted");
        }
    }

    /// Stop every worker and return the pool to the uninitialized state.
    ///
    /// New submissions are rejected as soon as shutdown begins. Tasks already
    /// accepted still run before their workers exit. Teardown continues past
    /// failures and the first error is reported.
    ///
    /// # Errors
    ///
    /// - `PoolError::NotInitialized` if the pool is not running
    /// - `PoolError::SignalReleaseFailed` if workers could not be woken
    /// - `PoolError::ThreadJoinFailed` if a worker panicked or was the calling thread
    /// - `PoolError::ResourceTeardownFailed` if tasks were left behind
    pub fn shutdown(&self) -> Result<(), PoolError> {
        let Running { shared, workers } = {
            let mut lifecycle = self.lifecycle.write();
            let running = match std::mem::replace(&mut *lifecycle, Lifecycle::Uninitialized) {
                Lifecycle::Running(running) => running,
                other => {
                    *lifecycle = other;
                    return Err(PoolError::NotInitialized);
                }
            };
            *lifecycle = Lifecycle::ShuttingDown(Arc::clone(&running.shared));
            running
        };

        info!(pool_id = %self.id, worker_count = workers.len(), "Shutting down worker pool");

        let mut first_error: Option<PoolError> = None;

        shared.quit.store(true, Ordering::Release);
        for _ in 0..workers.len() {
            if let Err(err) = shared.signal.release(1) {
                error!(pool_id = %self.id, error = %err, "Failed to wake worker for shutdown");
                first_error.get_or_insert(err);
            }
        }

        let current = thread::current().id();
        for (worker_id, worker) in workers.into_iter().enumerate() {
            if worker.thread().id() == current {
                error!(pool_id = %self.id, worker_id = worker_id, "Shutdown called from a pool task");
                first_error.get_or_insert(PoolError::ThreadJoinFailed { worker_id });
                continue;
            }
            match worker.join() {
                Ok(()) => debug!(pool_id = %self.id, worker_id = worker_id, "Worker joined"),
                Err(_) => {
                    error!(pool_id = %self.id, worker_id = worker_id, "Worker panicked");
                    first_error.get_or_insert(PoolError::ThreadJoinFailed { worker_id });
                }
            }
        }

        let leftover = shared.store.drain().len();
        let unfinished = shared.in_flight.current();
        if leftover > 0 || unfinished > 0 {
            warn!(
                pool_id = %self.id,
                leftover = leftover,
                unfinished = unfinished,
                "Pool state not clean after workers exited"
            );
            first_error.get_or_insert(PoolError::ResourceTeardownFailed(format!(
                "{leftover} task(s) left in store, {unfinished} still in flight"
            )));
        }
        shared.in_flight.reset();

        *self.lifecycle.write() = Lifecycle::Uninitialized;
        info!(pool_id = %self.id, "Worker pool shut down complete");

        first_error.map_or(Ok(()), Err)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PoolState {
        self.lifecycle.read().state()
    }

    /// Whether the pool accepts tasks.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == PoolState::Running
    }

    /// Identifier of this handle, as logged in `pool_id` fields.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration this pool was built from.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Number of workers spawned by `initialize`.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Maximum number of tasks in flight at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.effective_capacity()
    }

    /// Tasks accepted but not yet finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.shared().map_or(0, |shared| shared.in_flight.current())
    }

    /// Tasks accepted but not yet claimed by a worker.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared().map_or(0, |shared| shared.store.len())
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(
            self.worker_count(),
            self.capacity(),
            self.in_flight(),
            self.queued(),
        )
    }

    fn shared(&self) -> Option<Arc<PoolShared>> {
        self.lifecycle.read().shared().map(Arc::clone)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Release the workers but DON'T join them: a pool dropped from one of
        // its own tasks would join itself. Pending tasks still drain.
        if let Lifecycle::Running(running) =
            std::mem::replace(self.lifecycle.get_mut(), Lifecycle::Uninitialized)
        {
            running.shared.quit.store(true, Ordering::Release);
            if let Err(err) = running.shared.signal.release(running.workers.len()) {
                warn!(pool_id = %self.id, error = %err, "Failed to wake workers on drop");
            }
            debug!(
                pool_id = %self.id,
                "WorkerPool dropped without explicit shutdown - workers will be detached"
            );
        }
    }
}

/// Stop and join the workers of a partially started pool.
fn abort_startup(shared: &PoolShared, workers: Vec<JoinHandle<()>>) {
    shared.quit.store(true, Ordering::Release);
    if let Err(err) = shared.signal.release(workers.len()) {
        error!(pool_id = %shared.pool_id, error = %err, "Failed to wake workers after failed startup");
    }
    for (worker_id, worker) in workers.into_iter().enumerate() {
        match worker.join() {
            Ok(()) => debug!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker joined after failed startup"),
            Err(_) => error!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker panicked during failed startup"),
        }
    }
}

/// Spawn a worker thread.
fn spawn_worker(
    worker_id: usize,
    config: &WorkerPoolConfig,
    shared: Arc<PoolShared>,
    startup: Arc<Latch>,
) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(format!("{}-{worker_id}", config.thread_name_prefix));
    if let Some(stack_size) = config.thread_stack_size {
        builder = builder.stack_size(stack_size);
    }

    builder.spawn(move || {
        startup.count_down();
        drop(startup);
        worker_loop(worker_id, &shared);
    })
}

/// Park on the signal, claim one task per permit, exit once quit is set and
/// the store is empty.
fn worker_loop(worker_id: usize, shared: &PoolShared) {
    debug!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker thread started");

    loop {
        shared.signal.acquire();

        let Some(task) = shared.store.pop() else {
            if shared.should_quit() {
                break;
            }
            // Every permit outside shutdown is paired with a pushed task.
            error!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker woken with no pending task");
            continue;
        };

        run_task(worker_id, shared, task);
    }

    debug!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker thread exiting");
}

fn run_task(worker_id: usize, shared: &PoolShared, task: BoxedTask) {
    debug!(pool_id = %shared.pool_id, worker_id = worker_id, "Worker executing task");

    match panic::catch_unwind(AssertUnwindSafe(move || task.run())) {
        Ok(()) => {
            shared.counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
        }
        Err(payload) => {
            shared.counters.panicked_tasks.fetch_add(1, Ordering::Relaxed);
            error!(
                pool_id = %shared.pool_id,
                worker_id = worker_id,
                panic = panic_message(payload.as_ref()),
                "Task panicked"
            );
        }
    }

    shared.in_flight.finish();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
