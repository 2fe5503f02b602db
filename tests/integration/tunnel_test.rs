//! End-to-end runs through the table-cipher tunnel

use super::bench_config;
use std::sync::Arc;
use std::time::Duration;
use tunbench::{BenchmarkConfig, Coordinator, TableDialer};
use tunbench_tests::{init_test_logging, start_origin, start_table_proxy};

/// Requests reach the origin through the proxy and are all timed
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_benchmark_through_tunnel() {
    init_test_logging();

    let origin = start_origin("Hello, World!").await;
    let proxy = start_table_proxy("test-secret").await;

    let config = bench_config(&format!("http://{}/ping", origin.addr), 4, 25);
    let dialer = TableDialer::from_password(proxy.to_string(), &config.password);
    let report = Coordinator::new(config, Arc::new(dialer)).run().await;

    assert_eq!(report.stats.total_attempted, 100);
    assert_eq!(report.stats.total_completed, 100);
    assert_eq!(report.workers.completed, 4);

    let seen = origin.requests();
    assert_eq!(seen.len(), 100);
    assert!(seen.iter().all(|r| r.path == "/ping"));

    let latency = report.stats.latency.unwrap();
    assert!(latency.mean > Duration::ZERO);
    assert!(latency.min <= latency.mean && latency.mean <= latency.max);
}

/// A proxy keyed with another password never yields a response
#[tokio::test]
async fn test_wrong_password_completes_nothing() {
    init_test_logging();

    let origin = start_origin("Hello, World!").await;
    let proxy = start_table_proxy("proxy-secret").await;

    let config = Arc::new(
        BenchmarkConfig::builder()
            .url(format!("http://{}/", origin.addr))
            .port(proxy.port())
            .password("client-secret")
            .workers(2)
            .requests_per_worker(3)
            .request_timeout(Some(Duration::from_millis(500)))
            .build()
            .unwrap(),
    );
    let dialer = TableDialer::from_password(proxy.to_string(), &config.password);
    let report = Coordinator::new(config, Arc::new(dialer)).run().await;

    assert_eq!(report.stats.total_attempted, 6);
    assert_eq!(report.stats.total_completed, 0);
    assert_eq!(report.workers.failed, 2);
    assert!(origin.requests().is_empty());
}

/// Nothing listening on the proxy address
#[tokio::test]
async fn test_unreachable_proxy_completes_nothing() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = bench_config("example.com/", 3, 2);
    let dialer = TableDialer::from_password(addr.to_string(), &config.password);
    let report = Coordinator::new(config, Arc::new(dialer)).run().await;

    assert_eq!(report.stats.total_attempted, 6);
    assert_eq!(report.stats.total_completed, 0);
    assert_eq!(report.workers.failed, 3);
}
