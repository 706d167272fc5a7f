//! Worker pool configuration structures.

use std::collections::HashMap;
use std::env::VarError;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable holding the worker count.
pub const ENV_WORKERS: &str = "GO_POOL_WORKERS";
/// Environment variable holding the task capacity.
pub const ENV_CAPACITY: &str = "GO_POOL_CAPACITY";
/// Environment variable holding the task order (`lifo` or `fifo`).
pub const ENV_ORDER: &str = "GO_POOL_ORDER";
/// Environment variable holding the worker thread name prefix.
pub const ENV_THREAD_PREFIX: &str = "GO_POOL_THREAD_PREFIX";
/// Environment variable holding the worker stack size in bytes.
pub const ENV_STACK_SIZE: &str = "GO_POOL_STACK_SIZE";

/// Order in which pending tasks are claimed by workers.
///
/// Under contention neither order says anything about when a task finishes
/// relative to the others; it only decides which pending task is claimed next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrder {
    /// Most recently submitted task first.
    #[default]
    Lifo,
    /// Oldest submitted task first.
    Fifo,
}

impl fmt::Display for TaskOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lifo => f.write_str("lifo"),
            Self::Fifo => f.write_str("fifo"),
        }
    }
}

impl FromStr for TaskOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lifo" => Ok(Self::Lifo),
            "fifo" => Ok(Self::Fifo),
            other => Err(format!("unknown task order `{other}` (expected lifo or fifo)")),
        }
    }
}

/// Configuration of a single worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of worker threads spawned by `initialize`.
    pub worker_count: usize,
    /// Maximum tasks in flight; `None` means one per worker.
    pub queue_capacity: Option<usize>,
    /// Order in which pending tasks are claimed.
    pub task_order: TaskOrder,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
    /// Stack size for worker threads; `None` uses the platform default.
    pub thread_stack_size: Option<usize>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            queue_capacity: None,
            task_order: TaskOrder::Lifo,
            thread_name_prefix: "go-worker".into(),
            thread_stack_size: None,
        }
    }
}

impl WorkerPoolConfig {
    /// Configuration with one worker per logical CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the maximum number of tasks in flight.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the order in which pending tasks are claimed.
    #[must_use]
    pub fn with_task_order(mut self, order: TaskOrder) -> Self {
        self.task_order = order;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Capacity actually enforced by the pool.
    #[must_use]
    pub fn effective_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.worker_count)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `GO_POOL_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable variable or validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(format!("{key}: {e}")),
        })
    }

    /// Build configuration from an arbitrary key lookup using the
    /// `GO_POOL_*` variable names.
    ///
    /// # Errors
    ///
    /// Returns a description of the first failed lookup, unparsable value, or
    /// validation failure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let mut cfg = Self::default();

        if let Some(workers) = parse_var::<usize, _>(&lookup, ENV_WORKERS)? {
            cfg.worker_count = workers;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, ENV_CAPACITY)? {
            cfg.queue_capacity = Some(capacity);
        }
        if let Some(order) = parse_var::<TaskOrder, _>(&lookup, ENV_ORDER)? {
            cfg.task_order = order;
        }
        if let Some(prefix) = lookup(ENV_THREAD_PREFIX)? {
            cfg.thread_name_prefix = prefix;
        }
        if let Some(stack) = parse_var::<usize, _>(&lookup, ENV_STACK_SIZE)? {
            cfg.thread_stack_size = Some(stack);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Result<Option<String>, String>,
{
    lookup(key)?
        .map(|raw| raw.trim().parse::<T>().map_err(|e| format!("{key}: {e}")))
        .transpose()
}

/// Configuration of several independent, named pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolSetConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, WorkerPoolConfig>,
}

impl PoolSetConfig {
    /// Validate all pools and ensure at least one pool exists.
    ///
    /// # Errors
    ///
    /// Returns a description naming the first invalid pool.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse pool set configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
