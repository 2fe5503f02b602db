//! Final run report: aggregate statistics plus run-level facts.

use crate::stats::AggregateStats;
use crate::worker::{StopReason, WorkerResult};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How many workers ended in each terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerTally {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub aborted: usize,
}

impl WorkerTally {
    pub fn record(&mut self, result: &WorkerResult) {
        match result.reason {
            StopReason::Completed => self.completed += 1,
            StopReason::Failed => self.failed += 1,
            StopReason::Cancelled => self.cancelled += 1,
            StopReason::Aborted => self.aborted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.failed + self.cancelled + self.aborted
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    #[serde(flatten)]
    pub stats: AggregateStats,

    /// Wall-clock time from the first spawn to the last result
    pub elapsed_ms: f64,

    pub workers: WorkerTally,
}

impl BenchReport {
    pub fn new(stats: AggregateStats, elapsed: Duration, workers: WorkerTally) -> Self {
        Self {
            stats,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            workers,
        }
    }

    /// Completed requests per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms <= 0.0 {
            return 0.0;
        }
        self.stats.total_completed as f64 / (self.elapsed_ms / 1000.0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("throughput_rps".into(), self.throughput().into());
        }
        serde_json::to_string_pretty(&value)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number of total requests: {}", self.stats.total_attempted)?;
        writeln!(
            f,
            "number of finished requests: {}",
            self.stats.total_completed
        )?;

        let Some(latency) = &self.stats.latency else {
            return Ok(());
        };

        writeln!(f)?;
        writeln!(f, "total time used: {:?}", latency.total)?;
        writeln!(f, "average time per request: {:?}", latency.mean)?;
        writeln!(f, "standard deviation: {:?}", latency.stddev)?;
        writeln!(f, "min / max: {:?} / {:?}", latency.min, latency.max)?;
        if let Some(p) = &latency.percentiles {
            writeln!(
                f,
                "p50 / p90 / p99: {:?} / {:?} / {:?}",
                p.p50, p.p90, p.p99
            )?;
        }
        writeln!(f, "throughput: {:.2} req/s", self.throughput())
    }
}
