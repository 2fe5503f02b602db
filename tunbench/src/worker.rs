//! One simulated client connection issuing requests back-to-back.
//!
//! A worker is `Running` until its request count is reached, a request fails,
//! or the run is cancelled. Whatever it has timed so far is handed to the
//! coordinator on every exit path, including a panic, through
//! [`ResultHandoff`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tunbench_common::BenchmarkConfig;
use tunbench_core::Dialer;
use tunbench_http::{DiagnosticSink, HttpClient, RequestExecutor};

/// Why a worker left the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every request completed
    Completed,
    /// A request failed; later requests were never issued
    Failed,
    /// Cancellation was observed
    Cancelled,
    /// The worker task ended without reaching a terminal state
    Aborted,
}

/// Successful request timings of one worker, in completion order.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub conn_id: usize,
    pub samples: Vec<Duration>,
    pub reason: StopReason,
}

pub struct Worker {
    conn_id: usize,
    config: Arc<BenchmarkConfig>,
    executor: RequestExecutor,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        conn_id: usize,
        config: Arc<BenchmarkConfig>,
        dialer: Arc<dyn Dialer>,
        sink: Option<DiagnosticSink>,
        cancel: CancellationToken,
    ) -> Self {
        let client = HttpClient::new(dialer, config.target.clone());
        let executor = RequestExecutor::new(client)
            .with_sink(sink)
            .with_timeout(config.request_timeout);
        Self {
            conn_id,
            config,
            executor,
            cancel,
        }
    }

    /// Run to a terminal state and return the timings.
    pub async fn run(mut self) -> WorkerResult {
        let mut samples = Vec::new();
        let reason = self.drive(&mut samples).await;
        WorkerResult {
            conn_id: self.conn_id,
            samples,
            reason,
        }
    }

    /// Run to a terminal state, delivering the result through `handoff`.
    pub(crate) async fn run_into(mut self, mut handoff: ResultHandoff) {
        let reason = self.drive(handoff.samples_mut()).await;
        handoff.finish(reason);
    }

    async fn drive(&mut self, samples: &mut Vec<Duration>) -> StopReason {
        let total = self.config.requests_per_worker;
        let interval = self.config.progress_interval;

        while samples.len() < total {
            if self.cancel.is_cancelled() {
                return StopReason::Cancelled;
            }

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return StopReason::Cancelled,
                outcome = self.executor.execute() => outcome,
            };

            match outcome {
                Ok(elapsed) => {
                    samples.push(elapsed);
                    let done = samples.len();
                    if is_progress_point(done, interval) {
                        info!(conn = self.conn_id, completed = done, "connection progress");
                    }
                }
                Err(e) => {
                    warn!(
                        conn = self.conn_id,
                        completed = samples.len(),
                        error = %e,
                        "request failed, stopping connection"
                    );
                    return StopReason::Failed;
                }
            }
        }

        debug!(
            conn = self.conn_id,
            connections = self.executor.client().connections_opened(),
            "all requests completed"
        );
        StopReason::Completed
    }
}

/// Progress is reported after every `interval`-th completed request.
fn is_progress_point(done: usize, interval: usize) -> bool {
    interval > 0 && done % interval == 0
}

/// Single-use delivery of a worker's samples to the coordinator.
///
/// Sends exactly once: on [`finish`](Self::finish), or from `Drop` with
/// [`StopReason::Aborted`] if the worker never reached a terminal state.
pub(crate) struct ResultHandoff {
    conn_id: usize,
    samples: Vec<Duration>,
    reason: StopReason,
    tx: Option<mpsc::UnboundedSender<WorkerResult>>,
}

impl ResultHandoff {
    pub(crate) fn new(conn_id: usize, tx: mpsc::UnboundedSender<WorkerResult>) -> Self {
        Self {
            conn_id,
            samples: Vec::new(),
            reason: StopReason::Aborted,
            tx: Some(tx),
        }
    }

    pub(crate) fn samples_mut(&mut self) -> &mut Vec<Duration> {
        &mut self.samples
    }

    pub(crate) fn finish(mut self, reason: StopReason) {
        self.reason = reason;
    }
}

impl Drop for ResultHandoff {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let result = WorkerResult {
            conn_id: self.conn_id,
            samples: std::mem::take(&mut self.samples),
            reason: self.reason,
        };
        if tx.send(result).is_err() {
            debug!(conn = self.conn_id, "coordinator gone, dropping worker result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
    use tunbench_common::{BenchError, Result};
    use tunbench_core::BoxedStream;

    const OK: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
    const TRUNCATED: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\nok";

    /// Answers with `OK` until request number `fail_at`, which gets a
    /// truncated body followed by a hang-up.
    struct FailAtDialer {
        fail_at: Option<usize>,
        served: Arc<AtomicUsize>,
    }

    async fn serve(mut io: DuplexStream, fail_at: Option<usize>, served: Arc<AtomicUsize>) {
        let mut pending = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let end = loop {
                if let Some(pos) = pending.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                match io.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => pending.extend_from_slice(&chunk[..n]),
                }
            };
            pending.drain(..end);
            let n = served.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(n) == fail_at {
                let _ = io.write_all(TRUNCATED).await;
                return;
            }
            if io.write_all(OK).await.is_err() {
                return;
            }
        }
    }

    #[async_trait]
    impl Dialer for FailAtDialer {
        async fn dial(&self, _target: &str) -> Result<BoxedStream> {
            let (client, server) = tokio::io::duplex(16 * 1024);
            tokio::spawn(serve(server, self.fail_at, Arc::clone(&self.served)));
            Ok(Box::pin(client))
        }
    }

    struct RefusingDialer;

    #[async_trait]
    impl Dialer for RefusingDialer {
        async fn dial(&self, target: &str) -> Result<BoxedStream> {
            Err(BenchError::dial(target, "network unreachable"))
        }
    }

    fn config(requests: usize) -> Arc<BenchmarkConfig> {
        Arc::new(
            BenchmarkConfig::builder()
                .url("example.com/")
                .port(8388)
                .password("pw")
                .requests_per_worker(requests)
                .progress_interval(2)
                .build()
                .unwrap(),
        )
    }

    fn worker(requests: usize, dialer: impl Dialer + 'static) -> Worker {
        Worker::new(
            1,
            config(requests),
            Arc::new(dialer),
            None,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_worker_completes_all_requests() {
        let served = Arc::new(AtomicUsize::new(0));
        let result = worker(
            5,
            FailAtDialer {
                fail_at: None,
                served: Arc::clone(&served),
            },
        )
        .run()
        .await;

        assert_eq!(result.reason, StopReason::Completed);
        assert_eq!(result.samples.len(), 5);
        assert_eq!(served.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failure_on_kth_request_keeps_k_minus_one_samples() {
        for k in 1..=4 {
            let served = Arc::new(AtomicUsize::new(0));
            let result = worker(
                4,
                FailAtDialer {
                    fail_at: Some(k),
                    served: Arc::clone(&served),
                },
            )
            .run()
            .await;

            assert_eq!(result.reason, StopReason::Failed);
            assert_eq!(result.samples.len(), k - 1, "failing request {k}");
            // No request is issued after the failure.
            assert_eq!(served.load(Ordering::SeqCst), k);
        }
    }

    #[tokio::test]
    async fn test_dial_failure_yields_empty_result() {
        let result = worker(3, RefusingDialer).run().await;
        assert_eq!(result.reason, StopReason::Failed);
        assert!(result.samples.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_worker_stops_before_next_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let served = Arc::new(AtomicUsize::new(0));
        let worker = Worker::new(
            7,
            config(3),
            Arc::new(FailAtDialer {
                fail_at: None,
                served: Arc::clone(&served),
            }),
            None,
            cancel,
        );

        let result = worker.run().await;
        assert_eq!(result.conn_id, 7);
        assert_eq!(result.reason, StopReason::Cancelled);
        assert!(result.samples.is_empty());
        assert_eq!(served.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_progress_points() {
        let hits: Vec<usize> = (1..=7).filter(|&n| is_progress_point(n, 2)).collect();
        assert_eq!(hits, vec![2, 4, 6]);
        assert!(is_progress_point(1000, 1000));
        assert!(!is_progress_point(999, 1000));
        assert!(is_progress_point(3, 1));
        assert!(!is_progress_point(3, 0));
    }

    #[tokio::test]
    async fn test_handoff_sends_once_even_when_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut handoff = ResultHandoff::new(3, tx.clone());
        handoff.samples_mut().push(Duration::from_millis(1));
        drop(handoff);

        let handoff = ResultHandoff::new(4, tx);
        handoff.finish(StopReason::Completed);

        let aborted = rx.recv().await.unwrap();
        assert_eq!(aborted.conn_id, 3);
        assert_eq!(aborted.reason, StopReason::Aborted);
        assert_eq!(aborted.samples, vec![Duration::from_millis(1)]);

        let finished = rx.recv().await.unwrap();
        assert_eq!(finished.conn_id, 4);
        assert_eq!(finished.reason, StopReason::Completed);
        assert!(rx.recv().await.is_none());
    }
}
