//! Benchmarks for the worker pool.
//!
//! Benchmarks cover:
//! - Task store push/pop in both claim orders
//! - Fork/join rounds (submit N tasks, wait for idle)
//! - Pool startup and shutdown

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use prometheus_go_pool::core::TaskStore;
use prometheus_go_pool::{TaskOrder, WorkerPool, WorkerPoolConfig};

// ============================================================================
// Task Store Benchmarks
// ============================================================================

fn bench_store_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_store");

    for order in [TaskOrder::Lifo, TaskOrder::Fifo] {
        for size in [16_usize, 256, 1024] {
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("push_pop_{order}"), size),
                &size,
                |b, &size| {
                    let store = TaskStore::with_capacity(size, order).unwrap();
                    b.iter(|| {
                        for _ in 0..size {
                            store.push(Box::new(|| {})).unwrap();
                        }
                        while let Some(task) = store.pop() {
                            black_box(task);
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Fork/Join Benchmarks
// ============================================================================

fn bench_fork_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("fork_join");

    for workers in [1_usize, 4, 8] {
        let tasks = 256_usize;
        group.throughput(Throughput::Elements(tasks as u64));
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            let pool = WorkerPool::start(
                WorkerPoolConfig::new()
                    .with_worker_count(workers)
                    .with_queue_capacity(tasks),
            )
            .unwrap();
            let sum = Arc::new(AtomicU64::new(0));

            b.iter(|| {
                for i in 0..tasks as u64 {
                    let sum = Arc::clone(&sum);
                    pool.submit(move || {
                        sum.fetch_add(black_box(i), Ordering::Relaxed);
                    })
                    .unwrap();
                }
                pool.wait_idle();
            });

            pool.shutdown().unwrap();
        });
    }

    group.finish();
}

// ============================================================================
// Lifecycle Benchmarks
// ============================================================================

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    for workers in [1_usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("start_stop", workers), &workers, |b, &workers| {
            let pool = WorkerPool::new(WorkerPoolConfig::new().with_worker_count(workers)).unwrap();
            b.iter(|| {
                pool.initialize().unwrap();
                pool.shutdown().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(store_benches, bench_store_push_pop);
criterion_group!(pool_benches, bench_fork_join, bench_lifecycle);
criterion_main!(store_benches, pool_benches);
