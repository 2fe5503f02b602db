//! One timed request: send, drain the body, report elapsed wall-clock time.

use crate::client::HttpClient;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;
use tunbench_common::{BenchError, Result, TargetUrl};

/// Receives every body chunk when debug echo is enabled.
pub type DiagnosticSink = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Sink that copies body chunks to standard error.
pub fn stderr_sink() -> DiagnosticSink {
    Arc::new(|chunk: &[u8]| {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(chunk);
    })
}

/// Issue one GET through `client` and read the body to its end.
///
/// The duration covers sending the request through the last body byte. A
/// send failure returns before any duration is measured; a body error other
/// than a clean end-of-stream is a [`BenchError::Transfer`].
pub async fn execute_one_request(
    client: &mut HttpClient,
    sink: Option<&DiagnosticSink>,
) -> Result<Duration> {
    let start = Instant::now();
    let response = client.get().await?;
    trace!(status = %response.status(), "response head received");
    drain_body(response.into_body(), client.target(), sink).await?;
    Ok(start.elapsed())
}

async fn drain_body(
    mut body: Incoming,
    target: &TargetUrl,
    sink: Option<&DiagnosticSink>,
) -> Result<u64> {
    let mut received = 0u64;
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| BenchError::transfer(target.to_string(), e))?;
        if let Some(chunk) = frame.data_ref() {
            received += chunk.len() as u64;
            if let Some(sink) = sink {
                sink(chunk);
            }
        }
    }
    trace!(bytes = received, "body drained");
    Ok(received)
}

/// A worker's request executor: its client plus the per-run options.
pub struct RequestExecutor {
    client: HttpClient,
    sink: Option<DiagnosticSink>,
    timeout: Option<Duration>,
}

impl RequestExecutor {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            sink: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Option<DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub async fn execute(&mut self) -> Result<Duration> {
        let Some(limit) = self.timeout else {
            return execute_one_request(&mut self.client, self.sink.as_ref()).await;
        };

        let attempt = execute_one_request(&mut self.client, self.sink.as_ref());
        match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => {
                // The connection is mid-exchange; never reuse it.
                self.client.reset();
                Err(BenchError::Timeout(format!(
                    "GET {} exceeded {:?}",
                    self.client.target(),
                    limit
                )))
            }
        }
    }
}
