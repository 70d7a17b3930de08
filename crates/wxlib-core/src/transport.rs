//! Transport trait for station communication.
//!
//! The [`Transport`] trait abstracts over the byte stream to a weather
//! station. The real implementation is `TcpTransport` in `wxlib-transport`;
//! tests substitute loopback streams or mocks from `wxlib-test-harness`.
//!
//! The fetch client in `wxlib-station` operates on a `Transport` rather
//! than directly on a socket, so the framed request/response exchange can
//! be exercised deterministically without a station on the network.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a station.
///
/// Implementations handle connection state and timeouts at the socket
/// layer. Frame-level concerns (magic bytes, length fields, byte-sum
/// checksums) are handled by the protocol code that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the station.
    ///
    /// Implementations should block until all bytes have been handed to
    /// the underlying socket.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the station into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Will wait up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
