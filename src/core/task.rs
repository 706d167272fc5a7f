//! Units of work and the bounded store that holds them until a worker claims one.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::config::TaskOrder;
use crate::core::PoolError;

/// A unit of work executed exactly once on a pool worker.
///
/// Implemented for every `FnOnce() + Send + 'static` closure, so most callers
/// never name this trait. Implement it directly for job types that carry
/// their own state.
///
/// # Example
///
/// ```rust
/// use prometheus_go_pool::Task;
///
/// struct Checksum {
///     bytes: Vec<u8>,
/// }
///
/// impl Task for Checksum {
///     fn run(self: Box<Self>) {
///         let sum: u32 = self.bytes.iter().map(|&b| u32::from(b)).sum();
///         assert_eq!(sum, 6);
///     }
/// }
///
/// let task: Box<dyn Task> = Box::new(Checksum { bytes: vec![1, 2, 3] });
/// task.run();
/// ```
pub trait Task: Send + 'static {
    /// Consume the task and run it on the current thread.
    fn run(self: Box<Self>);
}

impl<F> Task for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)();
    }
}

/// A type-erased task as held by the store.
pub type BoxedTask = Box<dyn Task>;

/// Bounded store of pending tasks guarded by a single mutex.
///
/// The lock is held only for the push or pop itself, never while a task runs.
pub struct TaskStore {
    tasks: Mutex<VecDeque<BoxedTask>>,
    capacity: usize,
    order: TaskOrder,
}

impl TaskStore {
    /// Create a store with room for `capacity` pending tasks.
    ///
    /// Storage is reserved up front so that pushes never allocate.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ResourceAllocationFailed` if the slots cannot be reserved.
    pub fn with_capacity(capacity: usize, order: TaskOrder) -> Result<Self, PoolError> {
        let mut tasks = VecDeque::new();
        tasks.try_reserve_exact(capacity).map_err(|e| {
            PoolError::ResourceAllocationFailed(format!("task store with {capacity} slots: {e}"))
        })?;

        Ok(Self {
            tasks: Mutex::new(tasks),
            capacity,
            order,
        })
    }

    /// Add a task to the store.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::QueueFull` without blocking when the store is full.
    /// The rejected task is dropped unrun.
    pub fn push(&self, task: BoxedTask) -> Result<(), PoolError> {
        let mut tasks = self.tasks.lock();
        if tasks.len() >= self.capacity {
            return Err(PoolError::QueueFull {
                capacity: self.capacity,
            });
        }
        tasks.push_back(task);
        Ok(())
    }

    /// Claim the next task according to the store's [`TaskOrder`].
    pub fn pop(&self) -> Option<BoxedTask> {
        let mut tasks = self.tasks.lock();
        match self.order {
            TaskOrder::Lifo => tasks.pop_back(),
            TaskOrder::Fifo => tasks.pop_front(),
        }
    }

    /// Take back the most recently pushed task regardless of order.
    pub fn pop_newest(&self) -> Option<BoxedTask> {
        self.tasks.lock().pop_back()
    }

    /// Remove every pending task without running it.
    pub fn drain(&self) -> Vec<BoxedTask> {
        self.tasks.lock().drain(..).collect()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Maximum number of pending tasks.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Order in which pending tasks are claimed.
    pub const fn order(&self) -> TaskOrder {
        self.order
    }
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("order", &self.order)
            .finish()
    }
}
