//! Core pool abstractions: tasks, the task store, in-flight tracking, and the worker pool.

pub mod error;
pub mod in_flight;
pub mod task;
pub mod worker_pool;

pub use error::{AppResult, ErrorKind, PoolError};
pub use in_flight::InFlight;
pub use task::{BoxedTask, Task, TaskStore};
pub use worker_pool::{PoolState, PoolStats, WorkerPool};
