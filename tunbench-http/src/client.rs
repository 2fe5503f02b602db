//! HTTP/1.1 client bound to a [`Dialer`].
//!
//! One client belongs to one worker. It keeps a single connection alive
//! between requests and dials a new one through the shared dialer whenever
//! the cached connection has been closed by the peer.

use bytes::Bytes;
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::header::{HOST, USER_AGENT};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tracing::debug;
use tunbench_common::{BenchError, Result, TargetUrl};
use tunbench_core::Dialer;

type RequestBody = Empty<Bytes>;

const USER_AGENT_VALUE: &str = concat!("tunbench/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient {
    dialer: Arc<dyn Dialer>,
    target: TargetUrl,
    sender: Option<http1::SendRequest<RequestBody>>,
    connections_opened: usize,
}

impl HttpClient {
    pub fn new(dialer: Arc<dyn Dialer>, target: TargetUrl) -> Self {
        Self {
            dialer,
            target,
            sender: None,
            connections_opened: 0,
        }
    }

    pub fn target(&self) -> &TargetUrl {
        &self.target
    }

    /// Physical connections dialed so far.
    pub fn connections_opened(&self) -> usize {
        self.connections_opened
    }

    /// Forget the cached connection; the next request dials again.
    pub fn reset(&mut self) {
        self.sender = None;
    }

    async fn connect(&mut self) -> Result<http1::SendRequest<RequestBody>> {
        let authority = self.target.authority();
        let stream = self.dialer.dial(&authority).await?;

        let (sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| BenchError::dial(&authority, e))?;

        // Drives the connection until either side closes it.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("HTTP/1.1 connection error: {:?}", e);
            }
        });

        self.connections_opened += 1;
        debug!(
            target_addr = %authority,
            connections = self.connections_opened,
            "opened HTTP/1.1 connection"
        );
        Ok(sender)
    }

    async fn ready_sender(&mut self) -> Result<&mut http1::SendRequest<RequestBody>> {
        if let Some(mut sender) = self.sender.take() {
            if !sender.is_closed() && sender.ready().await.is_ok() {
                return Ok(self.sender.insert(sender));
            }
            debug!("discarding closed HTTP/1.1 connection");
        }

        let mut sender = self.connect().await?;
        sender
            .ready()
            .await
            .map_err(|e| BenchError::request(self.target.to_string(), e))?;
        Ok(self.sender.insert(sender))
    }

    /// Send `GET` for the target and return the response head.
    ///
    /// The body is left unread; callers must drain it before the next request
    /// or the connection cannot be reused.
    pub async fn get(&mut self) -> Result<Response<Incoming>> {
        let url = self.target.to_string();
        let request = Request::get(self.target.path_and_query())
            .header(HOST, self.target.host_header())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Empty::new())
            .map_err(|e| BenchError::request(&url, e))?;

        let sender = self.ready_sender().await?;
        match sender.send_request(request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.sender = None;
                Err(BenchError::request(url, e))
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("target", &self.target)
            .field("connected", &self.sender.is_some())
            .field("connections_opened", &self.connections_opened)
            .finish_non_exhaustive()
    }
}
