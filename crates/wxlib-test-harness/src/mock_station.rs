//! Mock weather station for protocol-level testing.
//!
//! [`MockStation`] stands in for a WS980-class appliance on loopback: a
//! UDP socket that answers discovery datagrams and a TCP listener that
//! serves a live data frame to each connection. Responses are raw bytes
//! scripted by the test, so malformed and truncated stations are as easy
//! to simulate as healthy ones.
//!
//! # Example
//!
//! ```no_run
//! use wxlib_test_harness::MockStation;
//!
//! # async fn example() -> wxlib_core::Result<()> {
//! let mut station = MockStation::new().await?;
//! station.set_discovery_response(vec![/* short frame bytes */]);
//! station.set_live_data_response(vec![/* long frame bytes */]);
//! station.start();
//!
//! // Aim discovery probes at station.udp_addr() and fetches at
//! // station.tcp_addr().
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use wxlib_core::error::{Error, Result};

/// A scripted stand-in for a station on loopback.
///
/// The UDP side answers *every* datagram with the configured discovery
/// response; the TCP side accepts any number of connections, reads the
/// client's request, and writes back the configured live data response.
/// Sides without a configured response stay silent, which is how tests
/// simulate an absent or unresponsive station.
pub struct MockStation {
    udp_socket: Option<UdpSocket>,
    tcp_listener: Option<TcpListener>,
    udp_addr: SocketAddr,
    tcp_addr: SocketAddr,
    discovery_response: Option<Vec<u8>>,
    live_data_response: Option<Vec<u8>>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockStation {
    /// Bind the mock station's UDP and TCP sockets on random loopback
    /// ports.
    ///
    /// Nothing is served until [`start`](MockStation::start) is called,
    /// so responses can be scripted first.
    pub async fn new() -> Result<Self> {
        let udp_socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Transport(format!("failed to bind mock UDP socket: {}", e)))?;
        let udp_addr = udp_socket.local_addr().map_err(Error::Io)?;

        let tcp_listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Transport(format!("failed to bind mock TCP listener: {}", e)))?;
        let tcp_addr = tcp_listener.local_addr().map_err(Error::Io)?;

        Ok(Self {
            udp_socket: Some(udp_socket),
            tcp_listener: Some(tcp_listener),
            udp_addr,
            tcp_addr,
            discovery_response: None,
            live_data_response: None,
            tasks: Vec::new(),
        })
    }

    /// Address discovery probes should be sent to.
    pub fn udp_addr(&self) -> SocketAddr {
        self.udp_addr
    }

    /// Address fetch clients should connect to.
    pub fn tcp_addr(&self) -> SocketAddr {
        self.tcp_addr
    }

    /// Script the datagram sent in reply to every discovery probe.
    pub fn set_discovery_response(&mut self, response: Vec<u8>) {
        self.discovery_response = Some(response);
    }

    /// Script the frame served to every TCP connection.
    pub fn set_live_data_response(&mut self, response: Vec<u8>) {
        self.live_data_response = Some(response);
    }

    /// Start serving the scripted responses in background tasks.
    ///
    /// The tasks run until the `MockStation` is dropped.
    pub fn start(&mut self) {
        if let (Some(socket), Some(response)) = (self.udp_socket.take(), self.discovery_response.clone()) {
            self.tasks.push(tokio::spawn(async move {
                let mut buf = [0u8; 256];
                loop {
                    let (n, src) = match socket.recv_from(&mut buf).await {
                        Ok(received) => received,
                        Err(e) => {
                            tracing::debug!(error = %e, "Mock UDP socket closed");
                            break;
                        }
                    };
                    tracing::trace!(bytes = n, src = %src, "Mock station got a probe");
                    let _ = socket.send_to(&response, src).await;
                }
            }));
        }

        if let (Some(listener), Some(response)) = (self.tcp_listener.take(), self.live_data_response.clone()) {
            self.tasks.push(tokio::spawn(async move {
                loop {
                    let (mut stream, peer) = match listener.accept().await {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::debug!(error = %e, "Mock TCP listener closed");
                            break;
                        }
                    };
                    tracing::trace!(peer = %peer, "Mock station accepted a fetch");

                    let response = response.clone();
                    tokio::spawn(async move {
                        // The live data request is a fixed 8 bytes; read
                        // it before answering, as the real firmware does.
                        let mut request = [0u8; 8];
                        if stream.read_exact(&mut request).await.is_ok() {
                            let _ = stream.write_all(&response).await;
                            let _ = stream.flush().await;
                        }
                    });
                }
            }));
        }
    }
}

impl Drop for MockStation {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpStream;

    const LIVE_DATA_REQUEST: [u8; 8] = [0xFF, 0xFF, 0x0B, 0x00, 0x06, 0x04, 0x04, 0x19];

    #[tokio::test]
    async fn answers_discovery_probes() {
        let mut station = MockStation::new().await.unwrap();
        station.set_discovery_response(vec![0xAB, 0xCD]);
        station.start();

        let probe = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        probe.send_to(&[0x01], station.udp_addr()).await.unwrap();

        let mut buf = [0u8; 16];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), probe.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..n], &[0xAB, 0xCD]);
    }

    #[tokio::test]
    async fn serves_live_data_over_tcp() {
        let mut station = MockStation::new().await.unwrap();
        station.set_live_data_response(vec![0x11, 0x22, 0x33]);
        station.start();

        let mut stream = TcpStream::connect(station.tcp_addr()).await.unwrap();
        stream.write_all(&LIVE_DATA_REQUEST).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert_eq!(response, vec![0x11, 0x22, 0x33]);
    }

    #[tokio::test]
    async fn serves_multiple_connections() {
        let mut station = MockStation::new().await.unwrap();
        station.set_live_data_response(vec![0x42]);
        station.start();

        for _ in 0..3 {
            let mut stream = TcpStream::connect(station.tcp_addr()).await.unwrap();
            stream.write_all(&LIVE_DATA_REQUEST).await.unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).await.unwrap();
            assert_eq!(response, vec![0x42]);
        }
    }

    #[tokio::test]
    async fn silent_without_scripted_responses() {
        let mut station = MockStation::new().await.unwrap();
        station.start();

        let probe = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        probe.send_to(&[0x01], station.udp_addr()).await.unwrap();

        let mut buf = [0u8; 16];
        let result =
            tokio::time::timeout(Duration::from_millis(100), probe.recv_from(&mut buf)).await;
        assert!(result.is_err(), "unconfigured mock must stay silent");
    }
}
