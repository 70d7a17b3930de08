//! Transport implementations for wxlib.
//!
//! This crate provides the concrete socket layers the station protocol
//! runs over:
//!
//! - [`TcpTransport`]: implements the [`Transport`](wxlib_core::Transport)
//!   trait for the station's TCP data port (one request/response per
//!   connection)
//! - [`UdpTransport`]: datagram socket used to broadcast the discovery
//!   search command and receive the station's answer
//!
//! # Example
//!
//! ```no_run
//! use wxlib_transport::TcpTransport;
//! use wxlib_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> wxlib_core::Result<()> {
//! let mut transport = TcpTransport::connect("192.168.1.42:45000").await?;
//! transport.send(&[0xFF, 0xFF, 0x0B, 0x00, 0x06, 0x04, 0x04, 0x19]).await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod tcp;
pub mod udp;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;
