//! Tests for error types

use prometheus_go_pool::core::{ErrorKind, PoolError};

#[test]
fn test_already_running_error() {
    let err = PoolError::AlreadyRunning;
    assert_eq!(format!("{}", err), "pool is already running");
    assert_eq!(err.kind(), ErrorKind::AlreadyRunning);
}

#[test]
fn test_not_initialized_error() {
    let err = PoolError::NotInitialized;
    assert_eq!(format!("{}", err), "pool is not initialized");
    assert_eq!(err.kind(), ErrorKind::NotInitialized);
}

#[test]
fn test_queue_full_error() {
    let err = PoolError::QueueFull { capacity: 8 };
    assert_eq!(format!("{}", err), "task queue is full (capacity 8)");
    assert_eq!(err.kind(), ErrorKind::QueueFull);
}

#[test]
fn test_signal_release_error() {
    let err = PoolError::SignalReleaseFailed { requested: 3 };
    assert_eq!(
        format!("{}", err),
        "failed to release 3 permit(s) on the worker signal"
    );
}

#[test]
fn test_teardown_error() {
    let err = PoolError::ResourceTeardownFailed("1 task(s) left in store".to_string());
    assert_eq!(
        format!("{}", err),
        "resource teardown failed: 1 task(s) left in store"
    );
    assert_eq!(err.kind(), ErrorKind::ResourceTeardownFailed);
}

#[test]
fn test_error_kind_display() {
    assert_eq!(ErrorKind::QueueFull.to_string(), "queue_full");
    assert_eq!(ErrorKind::ThreadJoinFailed.to_string(), "thread_join_failed");
}

#[test]
fn test_pool_error_into_anyhow() {
    let err: anyhow::Error = PoolError::QueueFull { capacity: 2 }.into();
    let pool_err = err.downcast_ref::<PoolError>().expect("Expected a PoolError");
    assert_eq!(pool_err.kind(), ErrorKind::QueueFull);
}
