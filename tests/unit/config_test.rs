//! Tests for configuration validation

use prometheus_go_pool::config::{PoolSetConfig, TaskOrder, WorkerPoolConfig};
use std::collections::HashMap;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>, String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| Ok(vars.get(key).cloned())
}

#[test]
fn test_worker_pool_config_defaults() {
    let config = WorkerPoolConfig::new();
    assert!(config.worker_count >= 1);
    assert_eq!(config.queue_capacity, None);
    assert_eq!(config.task_order, TaskOrder::Lifo);
    assert_eq!(config.effective_capacity(), config.worker_count);
    assert!(config.validate().is_ok());
}

#[test]
fn test_worker_pool_config_builder() {
    let config = WorkerPoolConfig::new()
        .with_worker_count(3)
        .with_queue_capacity(12)
        .with_task_order(TaskOrder::Fifo)
        .with_thread_name_prefix("render")
        .with_thread_stack_size(256 * 1024);

    assert_eq!(config.worker_count, 3);
    assert_eq!(config.effective_capacity(), 12);
    assert_eq!(config.task_order, TaskOrder::Fifo);
    assert_eq!(config.thread_name_prefix, "render");
    assert_eq!(config.thread_stack_size, Some(256 * 1024));
}

#[test]
fn test_worker_pool_config_invalid_worker_count() {
    let invalid = WorkerPoolConfig::new().with_worker_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_invalid_capacity() {
    let invalid = WorkerPoolConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_invalid_prefix() {
    let invalid = WorkerPoolConfig::new().with_thread_name_prefix("  ");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_from_json() {
    let json = r#"{ "worker_count": 2, "task_order": "fifo" }"#;
    let config = WorkerPoolConfig::from_json_str(json).expect("Failed to parse");
    assert_eq!(config.worker_count, 2);
    assert_eq!(config.task_order, TaskOrder::Fifo);
    assert_eq!(config.thread_name_prefix, "go-worker");
}

#[test]
fn test_worker_pool_config_from_json_invalid() {
    assert!(WorkerPoolConfig::from_json_str(r#"{ "worker_count": 0 }"#).is_err());
    assert!(WorkerPoolConfig::from_json_str("not json").is_err());
}

#[test]
fn test_worker_pool_config_from_lookup() {
    let lookup = lookup_from(&[
        ("GO_POOL_WORKERS", "6"),
        ("GO_POOL_CAPACITY", " 24 "),
        ("GO_POOL_ORDER", "FIFO"),
        ("GO_POOL_THREAD_PREFIX", "batch"),
    ]);
    let config = WorkerPoolConfig::from_lookup(lookup).expect("Failed to load");

    assert_eq!(config.worker_count, 6);
    assert_eq!(config.queue_capacity, Some(24));
    assert_eq!(config.task_order, TaskOrder::Fifo);
    assert_eq!(config.thread_name_prefix, "batch");
    assert_eq!(config.thread_stack_size, None);
}

#[test]
fn test_worker_pool_config_from_lookup_bad_value() {
    let err = WorkerPoolConfig::from_lookup(lookup_from(&[("GO_POOL_WORKERS", "many")]))
        .unwrap_err();
    assert!(err.starts_with("GO_POOL_WORKERS"));

    let err = WorkerPoolConfig::from_lookup(lookup_from(&[("GO_POOL_ORDER", "random")]))
        .unwrap_err();
    assert!(err.contains("unknown task order"));
}

#[test]
fn test_task_order_round_trip_text() {
    assert_eq!("lifo".parse::<TaskOrder>(), Ok(TaskOrder::Lifo));
    assert_eq!(TaskOrder::Fifo.to_string(), "fifo");
}

#[test]
fn test_pool_set_config_validation() {
    let mut pools = HashMap::new();
    pools.insert("pool1".to_string(), WorkerPoolConfig::new().with_worker_count(2));

    let config = PoolSetConfig { pools };
    assert!(config.validate().is_ok());
}

#[test]
fn test_pool_set_config_empty_pools() {
    let config = PoolSetConfig {
        pools: HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_pool_set_config_names_invalid_pool() {
    let json = r#"{ "pools": { "bad": { "worker_count": 0 } } }"#;
    let err = PoolSetConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("pool `bad` invalid"));
}
