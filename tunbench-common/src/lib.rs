//! Common configuration and error types for `tunbench`

pub mod config;
pub mod constants;
pub mod error;

pub use config::{normalize_url, BenchmarkConfig, BenchmarkConfigBuilder, TargetUrl};
pub use constants::{DEFAULT_HTTP_PORT, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SERVER_HOST};
pub use error::{BenchError, Result};
