//! Fan-out of workers, fan-in of their timings, aggregation.

use crate::report::{BenchReport, WorkerTally};
use crate::stats::AggregateStats;
use crate::worker::{ResultHandoff, Worker};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tunbench_common::BenchmarkConfig;
use tunbench_core::Dialer;
use tunbench_http::DiagnosticSink;

/// Runs one benchmark: `workers` concurrent connections, each issuing
/// `requests_per_worker` sequential requests.
pub struct Coordinator {
    config: Arc<BenchmarkConfig>,
    dialer: Arc<dyn Dialer>,
    sink: Option<DiagnosticSink>,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(config: Arc<BenchmarkConfig>, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            config,
            dialer,
            sink: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Echo response bodies to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Stop every worker once `cancel` fires; an in-flight request is abandoned.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every worker to completion and aggregate their timings.
    ///
    /// Worker failures only shorten that worker's sample set; this never
    /// fails. Zero completed requests is a normal outcome.
    pub async fn run(&self) -> BenchReport {
        let workers = self.config.workers;
        let per_worker = self.config.requests_per_worker;
        let total_attempted = self.config.total_attempted();

        info!(
            url = %self.config.target,
            workers,
            requests_per_worker = per_worker,
            "starting benchmark"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();

        for conn_id in 1..=workers {
            let worker = Worker::new(
                conn_id,
                Arc::clone(&self.config),
                Arc::clone(&self.dialer),
                self.sink.clone(),
                self.cancel.clone(),
            );
            let handoff = ResultHandoff::new(conn_id, tx.clone());
            tokio::spawn(worker.run_into(handoff));
        }
        // Only the workers' senders remain, so `recv` ends once all are gone.
        drop(tx);

        let mut pool = Vec::new();
        let mut tally = WorkerTally::default();
        while tally.total() < workers {
            let Some(result) = rx.recv().await else {
                break;
            };
            debug!(
                conn = result.conn_id,
                samples = result.samples.len(),
                reason = ?result.reason,
                "worker finished"
            );
            tally.record(&result);
            pool.extend(result.samples);
        }
        let elapsed = started.elapsed();

        if tally.total() < workers {
            warn!(
                received = tally.total(),
                expected = workers,
                "some workers never reported"
            );
        }
        if tally.failed > 0 || tally.cancelled > 0 || tally.aborted > 0 {
            info!(
                completed = tally.completed,
                failed = tally.failed,
                cancelled = tally.cancelled,
                aborted = tally.aborted,
                "workers stopped early"
            );
        }

        BenchReport::new(
            AggregateStats::compute(total_attempted, &pool),
            elapsed,
            tally,
        )
    }
}
