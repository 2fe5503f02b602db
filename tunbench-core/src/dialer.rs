//! The dialer contract consumed by the HTTP client.

use crate::cipher::CipherTable;
use crate::transport::table::{encode_target_header, TableStream};
use crate::transport::{connect_tcp, BoxedStream};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tunbench_common::{BenchError, Result};

/// Opens a fresh connection to `target` (`host:port`).
///
/// Implementations are shared by every worker behind an `Arc` and may be
/// called concurrently. Each call returns an independent stream; failures
/// come back as [`BenchError::Dial`].
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, target: &str) -> Result<BoxedStream>;
}

/// Reaches targets through a table-cipher proxy.
#[derive(Debug, Clone)]
pub struct TableDialer {
    proxy_addr: String,
    table: Arc<CipherTable>,
}

impl TableDialer {
    pub fn new(proxy_addr: impl Into<String>, table: Arc<CipherTable>) -> Self {
        Self {
            proxy_addr: proxy_addr.into(),
            table,
        }
    }

    /// Derive the table from `password` and dial through `proxy_addr`.
    pub fn from_password(proxy_addr: impl Into<String>, password: &str) -> Self {
        Self::new(proxy_addr, Arc::new(CipherTable::from_password(password)))
    }
}

#[async_trait]
impl Dialer for TableDialer {
    async fn dial(&self, target: &str) -> Result<BoxedStream> {
        let header = encode_target_header(target).map_err(|e| BenchError::dial(target, e))?;

        let tcp = connect_tcp(&self.proxy_addr).await.map_err(|e| {
            BenchError::dial(target, format!("proxy {}: {e}", self.proxy_addr))
        })?;
        let mut stream = TableStream::new(tcp, Arc::clone(&self.table));
        stream
            .write_all(&header)
            .await
            .map_err(|e| BenchError::dial(target, e))?;
        stream.flush().await.map_err(|e| BenchError::dial(target, e))?;

        debug!(target_addr = %target, proxy = %self.proxy_addr, "tunnel established");
        Ok(Box::pin(stream))
    }
}
