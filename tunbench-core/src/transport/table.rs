//! Table-cipher stream wrapper and target address header.

use crate::cipher::CipherTable;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Address type tag for a length-prefixed domain name.
const ADDR_TYPE_DOMAIN: u8 = 0x03;

/// Build the address header the proxy expects as the first bytes of a
/// connection: `[0x03, len(host), host.., port_be16]`.
pub fn encode_target_header(target: &str) -> io::Result<Vec<u8>> {
    let (host, port) = target.rsplit_once(':').ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("target {target:?} is not host:port"),
        )
    })?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port: u16 = port.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid port in {target:?}: {e}"),
        )
    })?;
    let host_len = u8::try_from(host.len())
        .ok()
        .filter(|&len| len > 0)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("host in {target:?} must be 1-255 bytes"),
            )
        })?;

    let mut header = Vec::with_capacity(host.len() + 4);
    header.push(ADDR_TYPE_DOMAIN);
    header.push(host_len);
    header.extend_from_slice(host.as_bytes());
    header.extend_from_slice(&port.to_be_bytes());
    Ok(header)
}

/// Stream that substitutes every byte through a [`CipherTable`]: writes are
/// encoded, reads are decoded.
///
/// Encoded bytes the inner stream has not accepted yet are buffered and
/// drained before the next write, on flush and on shutdown.
pub struct TableStream<S> {
    inner: S,
    table: Arc<CipherTable>,
    pending: Vec<u8>,
    written: usize,
}

impl<S> TableStream<S> {
    pub fn new(inner: S, table: Arc<CipherTable>) -> Self {
        Self {
            inner,
            table,
            pending: Vec::new(),
            written: 0,
        }
    }
}

impl<S: AsyncWrite + Unpin> TableStream<S> {
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.written < self.pending.len() {
            let n = ready!(Pin::new(&mut self.inner).poll_write(cx, &self.pending[self.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.written += n;
        }
        self.pending.clear();
        self.written = 0;
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for TableStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.table.decode_in_place(&mut buf.filled_mut()[before..]);
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for TableStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;

        this.pending.extend_from_slice(buf);
        this.table.encode_in_place(&mut this.pending);
        // Opportunistic; whatever is left goes out on the next write or flush.
        if let Poll::Ready(Err(e)) = this.poll_drain(cx) {
            return Poll::Ready(Err(e));
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}
