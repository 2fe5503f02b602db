//! Coordinator and worker behavior against scripted connections

use super::bench_config;
use std::sync::Arc;
use std::time::Duration;
use tunbench::{Coordinator, Dialer};
use tunbench_tests::{
    init_test_logging, start_origin, DirectDialer, Plan, RefusingDialer, ScriptedDialer,
};

fn fail_at(k: usize) -> Plan {
    Plan {
        fail_at: Some(k),
        ..Plan::default()
    }
}

/// Attempted count depends only on the configuration
#[tokio::test]
async fn test_attempted_and_completed_when_everything_succeeds() {
    init_test_logging();

    for (workers, requests) in [(1, 1), (3, 4), (8, 2)] {
        let dialer = Arc::new(ScriptedDialer::healthy());
        let config = bench_config("example.com/", workers, requests);
        let report = Coordinator::new(config, dialer.clone()).run().await;

        assert_eq!(report.stats.total_attempted, workers * requests);
        assert_eq!(report.stats.total_completed, workers * requests);
        assert_eq!(report.workers.completed, workers);
        // One kept-alive connection per worker
        assert_eq!(dialer.dials(), workers);
    }
}

/// Two workers, five requests each, one fails on its third request
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_one_worker_fails_midway() {
    init_test_logging();

    let dialer = Arc::new(ScriptedDialer::new([Plan::default(), fail_at(3)]));
    let report = Coordinator::new(bench_config("example.com/", 2, 5), dialer)
        .run()
        .await;

    assert_eq!(report.stats.total_attempted, 10);
    assert_eq!(report.stats.total_completed, 7);
    assert_eq!(report.workers.completed, 1);
    assert_eq!(report.workers.failed, 1);
}

/// Every worker fails its only request: counts are reported, nothing else
#[tokio::test]
async fn test_all_workers_fail() {
    init_test_logging();

    let report = Coordinator::new(bench_config("example.com/", 3, 1), Arc::new(RefusingDialer))
        .run()
        .await;

    assert_eq!(report.stats.total_attempted, 3);
    assert_eq!(report.stats.total_completed, 0);
    assert!(report.stats.latency.is_none());
    assert_eq!(
        report.to_string(),
        "number of total requests: 3\nnumber of finished requests: 0\n"
    );
}

/// Every connection breaks on its first request
#[tokio::test]
async fn test_failures_on_first_request() {
    let dialer = Arc::new(ScriptedDialer::new([fail_at(1), fail_at(1), fail_at(1)]));
    let report = Coordinator::new(bench_config("example.com/", 3, 10), dialer)
        .run()
        .await;

    assert_eq!(report.stats.total_attempted, 30);
    assert_eq!(report.stats.total_completed, 0);
    assert_eq!(report.workers.failed, 3);
}

/// Later workers finishing first does not change the totals
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_arrival_order_is_irrelevant() {
    let slow = Plan {
        delay: Duration::from_millis(20),
        ..Plan::default()
    };
    let fast = Plan::default();

    let dialer = Arc::new(ScriptedDialer::new([slow, fast, slow, fast]));
    let report = Coordinator::new(bench_config("example.com/", 4, 3), dialer)
        .run()
        .await;

    assert_eq!(report.stats.total_completed, 12);
    let latency = report.stats.latency.unwrap();
    assert!(latency.max >= Duration::from_millis(20));
    assert!(latency.min < Duration::from_millis(20));
}

/// A bare host/path target is requested as http://host/path
#[tokio::test]
async fn test_bare_url_is_normalized() {
    init_test_logging();

    let origin = start_origin("Hello, World!").await;
    let url = format!("{}/bench?id=7", origin.addr);
    let dialer: Arc<dyn Dialer> = Arc::new(DirectDialer);
    let report = Coordinator::new(bench_config(&url, 2, 3), dialer)
        .run()
        .await;

    assert_eq!(report.stats.total_completed, 6);
    let seen = origin.requests();
    assert_eq!(seen.len(), 6);
    for request in seen {
        assert_eq!(request.path, "/bench?id=7");
        assert_eq!(request.host, origin.addr.to_string());
    }
}

/// Debug echo sees every body without changing the outcome
#[tokio::test]
async fn test_debug_sink_receives_bodies() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let bytes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&bytes);
    let dialer = Arc::new(ScriptedDialer::healthy());
    let report = Coordinator::new(bench_config("example.com/", 2, 4), dialer)
        .with_sink(Arc::new(move |chunk: &[u8]| {
            counter.fetch_add(chunk.len(), Ordering::SeqCst);
        }))
        .run()
        .await;

    assert_eq!(report.stats.total_completed, 8);
    assert_eq!(bytes.load(Ordering::SeqCst), 8 * "Hello, World!".len());
}
