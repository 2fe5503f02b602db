//! Tunnel dialing for `tunbench`.
//!
//! The benchmark harness only sees the [`Dialer`] trait. [`TableDialer`] is
//! the concrete implementation used by the CLI: it reaches the target through
//! a remote proxy speaking the table-cipher protocol.

pub mod cipher;
pub mod dialer;
pub mod transport;

pub use cipher::CipherTable;
pub use dialer::{Dialer, TableDialer};
pub use transport::{AsyncStream, BoxedStream};
