//! Byte-stream plumbing under the dialer.

use std::io;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

pub mod socket_tuning;
pub mod table;

pub use table::TableStream;

pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// Connection handed out by a [`Dialer`](crate::Dialer).
pub type BoxedStream = Pin<Box<dyn AsyncStream>>;

/// Open a tuned TCP connection to `addr`.
pub async fn connect_tcp(addr: &str) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    socket_tuning::tune(&stream);
    Ok(stream)
}
