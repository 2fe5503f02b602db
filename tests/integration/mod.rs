#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for `tunbench`
//!
//! These tests run the whole harness against in-process origins and proxies.

mod harness_test;
mod tunnel_test;

use std::sync::Arc;
use tunbench::BenchmarkConfig;

/// Config for `workers` x `requests` against `url`.
pub fn bench_config(url: &str, workers: usize, requests: usize) -> Arc<BenchmarkConfig> {
    Arc::new(
        BenchmarkConfig::builder()
            .url(url)
            .port(8388)
            .password("test-secret")
            .workers(workers)
            .requests_per_worker(requests)
            .build()
            .unwrap(),
    )
}
