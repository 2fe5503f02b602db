//! Latency-oriented socket options.
//!
//! Requests are small and strictly sequential per connection, so Nagle's
//! algorithm would add a delay to every request. Keepalive lets long runs
//! notice a dead proxy.

use socket2::{SockRef, TcpKeepalive};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

const KEEPALIVE_TIME: Duration = Duration::from_secs(30);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

fn try_tune(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_TIME)
        .with_interval(KEEPALIVE_INTERVAL);
    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}

/// Apply socket options; failures are logged and otherwise ignored.
pub fn tune(stream: &TcpStream) {
    if let Err(e) = try_tune(stream) {
        debug!(error = %e, "socket tuning failed");
    }
}
