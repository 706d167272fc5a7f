//! Error types for pool operations.

use std::fmt;
use std::io;

use thiserror::Error;

/// Errors produced by pool lifecycle and submission operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// `initialize` was called while the pool is running or shutting down.
    #[error("pool is already running")]
    AlreadyRunning,
    /// A pool resource (task store, worker table) could not be allocated.
    #[error("resource allocation failed: {0}")]
    ResourceAllocationFailed(String),
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker {worker_id}: {source}")]
    ThreadSpawnFailed {
        /// Index of the worker that could not be spawned.
        worker_id: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The pool is not running (never initialized, shut down, or shutting down).
    #[error("pool is not initialized")]
    NotInitialized,
    /// The pool already holds as many accepted tasks as its capacity allows.
    #[error("task queue is full (capacity {capacity})")]
    QueueFull {
        /// Configured capacity of the pool.
        capacity: usize,
    },
    /// Permits could not be released on the worker semaphore.
    #[error("failed to release {requested} permit(s) on the worker signal")]
    SignalReleaseFailed {
        /// Number of permits the caller tried to release.
        requested: usize,
    },
    /// A worker thread terminated abnormally or could not be joined.
    #[error("failed to join worker {worker_id}")]
    ThreadJoinFailed {
        /// Index of the worker that could not be joined.
        worker_id: usize,
    },
    /// Pool state was inconsistent after all workers exited.
    #[error("resource teardown failed: {0}")]
    ResourceTeardownFailed(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Discriminant of a [`PoolError`], for callers that only match on kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`PoolError::AlreadyRunning`].
    AlreadyRunning,
    /// See [`PoolError::ResourceAllocationFailed`].
    ResourceAllocationFailed,
    /// See [`PoolError::ThreadSpawnFailed`].
    ThreadSpawnFailed,
    /// See [`PoolError::NotInitialized`].
    NotInitialized,
    /// See [`PoolError::QueueFull`].
    QueueFull,
    /// See [`PoolError::SignalReleaseFailed`].
    SignalReleaseFailed,
    /// See [`PoolError::ThreadJoinFailed`].
    ThreadJoinFailed,
    /// See [`PoolError::ResourceTeardownFailed`].
    ResourceTeardownFailed,
    /// See [`PoolError::InvalidConfig`].
    InvalidConfig,
}

impl PoolError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyRunning => ErrorKind::AlreadyRunning,
            Self::ResourceAllocationFailed(_) => ErrorKind::ResourceAllocationFailed,
            Self::ThreadSpawnFailed { .. } => ErrorKind::ThreadSpawnFailed,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::QueueFull { .. } => ErrorKind::QueueFull,
            Self::SignalReleaseFailed { .. } => ErrorKind::SignalReleaseFailed,
            Self::ThreadJoinFailed { .. } => ErrorKind::ThreadJoinFailed,
            Self::ResourceTeardownFailed(_) => ErrorKind::ResourceTeardownFailed,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Only a full queue is transient; the pool never retries on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AlreadyRunning => "already_running",
            Self::ResourceAllocationFailed => "resource_allocation_failed",
            Self::ThreadSpawnFailed => "thread_spawn_failed",
            Self::NotInitialized => "not_initialized",
            Self::QueueFull => "queue_full",
            Self::SignalReleaseFailed => "signal_release_failed",
            Self::ThreadJoinFailed => "thread_join_failed",
            Self::ResourceTeardownFailed => "resource_teardown_failed",
            Self::InvalidConfig => "invalid_config",
        };
        f.write_str(name)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
