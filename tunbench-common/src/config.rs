//! Benchmark configuration.
//!
//! A [`BenchmarkConfig`] is built once from user input, validated, and then
//! shared read-only (behind an `Arc`) by the coordinator and every worker.

use crate::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SERVER_HOST, HTTP_SCHEME_PREFIX,
};
use crate::error::{BenchError, Result};
use http::Uri;
use std::time::Duration;

/// Prefix `http://` onto a target given without a scheme.
///
/// `example.com/path` becomes `http://example.com/path`; anything that already
/// starts with `scheme://` is returned unchanged.
pub fn normalize_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BenchError::Config("target URL is empty".into()));
    }
    if has_scheme(raw) {
        Ok(raw.to_string())
    } else {
        Ok(format!("{HTTP_SCHEME_PREFIX}{raw}"))
    }
}

/// A scheme only counts ahead of the first path, query or fragment delimiter.
fn has_scheme(raw: &str) -> bool {
    let head = raw.split(['/', '?', '#']).next().unwrap_or_default();
    head.len() > 1 && head.ends_with(':') && raw[head.len()..].starts_with("//")
}

/// A parsed `http://` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    uri: Uri,
    host: String,
    port: u16,
}

impl TargetUrl {
    /// Normalize and parse a target URL. Only plain `http` is accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_url(raw)?;
        let uri: Uri = normalized
            .parse()
            .map_err(|e| BenchError::Config(format!("invalid URL {normalized:?}: {e}")))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(BenchError::Config(format!(
                    "unsupported scheme {other:?}, only http is tunneled"
                )))
            }
            None => return Err(BenchError::Config(format!("URL {normalized:?} has no scheme"))),
        }

        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| BenchError::Config(format!("URL {normalized:?} has no host")))?
            .to_string();
        let port = uri.port_u16().unwrap_or(DEFAULT_HTTP_PORT);

        Ok(Self { uri, host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` handed to the dialer.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Value for the `Host` header; the default port is left implicit.
    pub fn host_header(&self) -> String {
        if self.port == DEFAULT_HTTP_PORT {
            self.host.clone()
        } else {
            self.authority()
        }
    }

    pub fn path_and_query(&self) -> &str {
        match self.uri.path_and_query().map(http::uri::PathAndQuery::as_str) {
            Some(pq) if !pq.is_empty() => pq,
            _ => "/",
        }
    }
}

impl std::fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Immutable benchmark configuration.
///
/// Use [`BenchmarkConfig::builder()`] for construction; `build()` validates.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Target URL, already normalized
    pub target: TargetUrl,

    /// Tunnel proxy host
    pub server: String,

    /// Tunnel proxy port
    pub port: u16,

    /// Shared secret the cipher table is derived from
    pub password: String,

    /// Number of concurrent workers (one logical connection each)
    pub workers: usize,

    /// Requests issued back-to-back by every worker
    pub requests_per_worker: usize,

    /// Runtime worker threads
    pub cores: usize,

    /// Echo response bodies to the diagnostic sink
    pub debug: bool,

    /// Per-request deadline; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Completed-request interval between progress logs
    pub progress_interval: usize,
}

impl BenchmarkConfig {
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(BenchError::Config("server is required".into()));
        }
        if self.port == 0 {
            return Err(BenchError::Config("port is required".into()));
        }
        if self.password.is_empty() {
            return Err(BenchError::Config("password is required".into()));
        }
        if self.workers == 0 {
            return Err(BenchError::Config("worker count must be at least 1".into()));
        }
        if self.requests_per_worker == 0 {
            return Err(BenchError::Config(
                "requests per worker must be at least 1".into(),
            ));
        }
        if self.workers.checked_mul(self.requests_per_worker).is_none() {
            return Err(BenchError::Config(format!(
                "{} workers x {} requests overflows the request count",
                self.workers, self.requests_per_worker
            )));
        }
        if self.cores == 0 {
            return Err(BenchError::Config("core count must be at least 1".into()));
        }
        if self.progress_interval == 0 {
            return Err(BenchError::Config(
                "progress interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Proxy address as `host:port`, bracketing IPv6 literals.
    pub fn server_addr(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    /// Requests the run will attempt, fixed before any work starts.
    pub fn total_attempted(&self) -> usize {
        self.workers.saturating_mul(self.requests_per_worker)
    }
}

/// Builder for [`BenchmarkConfig`].
#[derive(Debug, Clone)]
pub struct BenchmarkConfigBuilder {
    url: Option<String>,
    server: String,
    port: u16,
    password: String,
    workers: usize,
    requests_per_worker: usize,
    cores: usize,
    debug: bool,
    request_timeout: Option<Duration>,
    progress_interval: usize,
}

impl Default for BenchmarkConfigBuilder {
    fn default() -> Self {
        Self {
            url: None,
            server: DEFAULT_SERVER_HOST.to_string(),
            port: 0,
            password: String::new(),
            workers: 1,
            requests_per_worker: 1,
            cores: 1,
            debug: false,
            request_timeout: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl BenchmarkConfigBuilder {
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn requests_per_worker(mut self, requests: usize) -> Self {
        self.requests_per_worker = requests;
        self
    }

    #[must_use]
    pub fn cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn build(self) -> Result<BenchmarkConfig> {
        let url = self
            .url
            .ok_or_else(|| BenchError::Config("target URL is required".into()))?;
        let config = BenchmarkConfig {
            target: TargetUrl::parse(&url)?,
            server: self.server,
            port: self.port,
            password: self.password,
            workers: self.workers,
            requests_per_worker: self.requests_per_worker,
            cores: self.cores,
            debug: self.debug,
            request_timeout: self.request_timeout,
            progress_interval: self.progress_interval,
        };
        config.validate()?;
        Ok(config)
    }
}
