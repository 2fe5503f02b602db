//! Concurrent latency benchmark harness.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tunbench::{BenchmarkConfig, Coordinator, TableDialer};
//!
//! # async fn example() -> tunbench::Result<()> {
//! let config = BenchmarkConfig::builder()
//!     .url("example.com/")
//!     .server("proxy.example.com")
//!     .port(8388)
//!     .password("secret")
//!     .workers(10)
//!     .requests_per_worker(100)
//!     .build()?;
//!
//! let dialer = TableDialer::from_password(config.server_addr(), &config.password);
//! let report = Coordinator::new(Arc::new(config), Arc::new(dialer)).run().await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod report;
pub mod stats;
pub mod worker;

pub use coordinator::Coordinator;
pub use report::BenchReport;
pub use stats::{AggregateStats, LatencySummary};
pub use worker::{StopReason, Worker, WorkerResult};

pub use tunbench_common::{BenchError, BenchmarkConfig, Result};
pub use tunbench_core::{Dialer, TableDialer};
pub use tunbench_http::{stderr_sink, DiagnosticSink};
