//! Tests for utility functions

use prometheus_go_pool::util::{init_tracing, init_tracing_with_default, DEFAULT_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    init_tracing_with_default("debug");
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_FILTER.starts_with("prometheus_go_pool"));
}
