//! Summary statistics over the pooled request timings.

use hdrhistogram::Histogram;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Durations serialize as integer nanoseconds.
mod nanos {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

fn as_nanos_u64(d: &Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Truncates toward zero, like converting a float count of nanoseconds to an
/// integer duration.
fn duration_from_nanos_f64(ns: f64) -> Duration {
    Duration::from_nanos(ns as u64)
}

/// Counts plus, when anything completed, the latency summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_attempted: usize,
    pub total_completed: usize,
    pub latency: Option<LatencySummary>,
}

impl AggregateStats {
    /// Pool-order independent: only sums, deviations and a histogram are used.
    pub fn compute(total_attempted: usize, samples: &[Duration]) -> Self {
        Self {
            total_attempted,
            total_completed: samples.len(),
            latency: LatencySummary::from_samples(samples),
        }
    }

    pub fn total_failed(&self) -> usize {
        self.total_attempted.saturating_sub(self.total_completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    /// Sum of all request durations
    #[serde(rename = "total_ns", with = "nanos")]
    pub total: Duration,

    #[serde(rename = "mean_ns", with = "nanos")]
    pub mean: Duration,

    /// Population standard deviation
    #[serde(rename = "stddev_ns", with = "nanos")]
    pub stddev: Duration,

    #[serde(rename = "min_ns", with = "nanos")]
    pub min: Duration,

    #[serde(rename = "max_ns", with = "nanos")]
    pub max: Duration,

    pub percentiles: Option<Percentiles>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentiles {
    #[serde(rename = "p50_ns", with = "nanos")]
    pub p50: Duration,
    #[serde(rename = "p90_ns", with = "nanos")]
    pub p90: Duration,
    #[serde(rename = "p99_ns", with = "nanos")]
    pub p99: Duration,
}

impl LatencySummary {
    /// `None` for an empty pool; nothing is divided by zero.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = samples.iter().min().copied()?;
        let max = samples.iter().max().copied()?;
        let count = samples.len() as f64;

        let sum: u128 = samples.iter().map(Duration::as_nanos).sum();
        let mean = sum as f64 / count;

        let squared_deviations: f64 = samples
            .iter()
            .map(|d| {
                let deviation = (d.as_nanos() as f64 - mean).abs();
                deviation * deviation
            })
            .sum();
        let stddev = (squared_deviations / count).sqrt();

        Some(Self {
            total: Duration::from_nanos(u64::try_from(sum).unwrap_or(u64::MAX)),
            mean: duration_from_nanos_f64(mean),
            stddev: duration_from_nanos_f64(stddev),
            min,
            max,
            percentiles: Percentiles::from_samples(samples),
        })
    }
}

impl Percentiles {
    fn from_samples(samples: &[Duration]) -> Option<Self> {
        let mut histogram = match Histogram::<u64>::new(3) {
            Ok(h) => h,
            Err(e) => {
                warn!("Failed to create latency histogram: {}", e);
                return None;
            }
        };
        for sample in samples {
            if histogram.record(as_nanos_u64(sample)).is_err() {
                warn!("Failed to record latency");
            }
        }
        if histogram.is_empty() {
            return None;
        }

        let at = |q: f64| Duration::from_nanos(histogram.value_at_quantile(q));
        Some(Self {
            p50: at(0.50),
            p90: at(0.90),
            p99: at(0.99),
        })
    }
}
