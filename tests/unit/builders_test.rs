//! Tests for builder modules

use prometheus_go_pool::builders::build_pools;
use prometheus_go_pool::config::{PoolSetConfig, WorkerPoolConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_build_pools_from_json() {
    let json = r#"{
        "pools": {
            "io": { "worker_count": 2, "thread_name_prefix": "io" },
            "cpu": { "worker_count": 1, "queue_capacity": 4, "task_order": "fifo" }
        }
    }"#;
    let cfg = PoolSetConfig::from_json_str(json).expect("Failed to parse config");

    let pools = build_pools(&cfg).expect("Failed to build pools");
    assert_eq!(pools.len(), 2);
    assert_eq!(pools["io"].worker_count(), 2);
    assert_eq!(pools["cpu"].capacity(), 4);

    let count = Arc::new(AtomicUsize::new(0));
    for pool in pools.values() {
        assert!(pool.is_running());
        let count = Arc::clone(&count);
        pool.submit(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Failed to submit");
    }

    for pool in pools.values() {
        pool.wait_idle();
        pool.shutdown().expect("Failed to shut down");
    }
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_build_pools_rejects_empty_config() {
    let cfg = PoolSetConfig {
        pools: HashMap::new(),
    };
    let err = build_pools(&cfg).unwrap_err();
    assert!(err.to_string().contains("config invalid"));
}

#[test]
fn test_build_pools_rejects_invalid_pool() {
    let mut pools = HashMap::new();
    pools.insert("broken".to_string(), WorkerPoolConfig::new().with_worker_count(0));
    let cfg = PoolSetConfig { pools };

    let err = build_pools(&cfg).unwrap_err();
    assert!(err.to_string().contains("broken"));
}
