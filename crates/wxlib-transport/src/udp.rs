//! UDP transport for station discovery.
//!
//! This module provides [`UdpTransport`], a datagram socket wrapper used to
//! broadcast the search command and collect the station's answer. Unlike
//! [`super::TcpTransport`], it does **not** implement the
//! [`Transport`](wxlib_core::Transport) trait: discovery is connectionless
//! and datagram-based rather than stream-oriented.
//!
//! # Example
//!
//! ```no_run
//! use wxlib_transport::UdpTransport;
//! use std::time::Duration;
//!
//! # async fn example() -> wxlib_core::Result<()> {
//! // Bind to any available port for a discovery probe.
//! let transport = UdpTransport::bind("0.0.0.0:0").await?;
//! transport.set_broadcast(true)?;
//!
//! // Send the search command to a broadcast address.
//! let search = [0xFF, 0xFF, 0x12, 0x00, 0x04, 0x16];
//! let broadcast_addr = "192.168.1.255:46000".parse().unwrap();
//! transport.send_to(&search, broadcast_addr).await?;
//!
//! // Wait for the station to answer.
//! let mut buf = [0u8; 256];
//! let (n, src) = transport.recv_from(&mut buf, Duration::from_secs(2)).await?;
//! println!("Received {} bytes from {}", n, src);
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use wxlib_core::error::{Error, Result};

/// UDP transport for datagram-based station discovery.
///
/// Wraps a [`tokio::net::UdpSocket`] with error mapping consistent with
/// the rest of the wxlib transport layer.
#[derive(Debug)]
pub struct UdpTransport {
    /// The underlying UDP socket.
    socket: UdpSocket,
    /// The local address the socket is bound to.
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind to a local address.
    ///
    /// Use `"0.0.0.0:0"` to bind to any available port on all interfaces;
    /// discovery probes do this so the station can answer the ephemeral
    /// source port directly.
    pub async fn bind(addr: &str) -> Result<Self> {
        tracing::debug!(addr = %addr, "Binding UDP socket");

        let socket = UdpSocket::bind(addr).await.map_err(|e| {
            tracing::warn!(addr = %addr, error = %e, "Failed to bind UDP socket");
            Error::Io(e)
        })?;

        let local_addr = socket.local_addr().map_err(Error::Io)?;

        tracing::debug!(local_addr = %local_addr, "UDP socket bound");

        Ok(Self { socket, local_addr })
    }

    /// Get the local address this socket is bound to.
    ///
    /// This is useful when binding to port 0 to discover the assigned port.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a datagram to the specified address.
    ///
    /// The entire `data` slice is sent as a single datagram; it either
    /// arrives in full or not at all.
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<()> {
        tracing::trace!(
            local = %self.local_addr,
            remote = %addr,
            bytes = data.len(),
            "Sending datagram"
        );

        self.socket.send_to(data, addr).await.map_err(|e| {
            tracing::warn!(
                local = %self.local_addr,
                remote = %addr,
                error = %e,
                "Failed to send datagram"
            );
            Error::Io(e)
        })?;

        Ok(())
    }

    /// Receive a datagram with timeout. Returns `(bytes_read, source_addr)`.
    ///
    /// The buffer should be large enough to hold an entire datagram; any
    /// excess bytes are silently discarded (standard UDP behavior). For a
    /// discovery response, 256 bytes is plenty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no datagram arrives within `timeout`.
    pub async fn recv_from(&self, buf: &mut [u8], timeout: Duration) -> Result<(usize, SocketAddr)> {
        let result = tokio::time::timeout(timeout, self.socket.recv_from(buf)).await;

        match result {
            Ok(Ok((n, src))) => {
                tracing::trace!(
                    local = %self.local_addr,
                    remote = %src,
                    bytes = n,
                    "Received datagram"
                );
                Ok((n, src))
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    local = %self.local_addr,
                    error = %e,
                    "Failed to receive datagram"
                );
                Err(Error::Io(e))
            }
            Err(_) => {
                tracing::trace!(
                    local = %self.local_addr,
                    timeout_ms = timeout.as_millis(),
                    "Timeout waiting for datagram"
                );
                Err(Error::Timeout)
            }
        }
    }

    /// Enable or disable broadcast on this socket.
    ///
    /// Must be enabled before sending the search command to a broadcast
    /// address.
    pub fn set_broadcast(&self, enable: bool) -> Result<()> {
        self.socket.set_broadcast(enable).map_err(|e| {
            tracing::warn!(
                local = %self.local_addr,
                error = %e,
                "Failed to set broadcast"
            );
            Error::Io(e)
        })
    }
}
