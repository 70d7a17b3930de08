//! Station discovery via UDP broadcast.
//!
//! WS980-class stations do not announce themselves; the client broadcasts
//! a search command on UDP port 46000 and the station answers the sender
//! directly with a short frame carrying its MAC, IPv4 address, TCP data
//! port, and display name. This module enumerates the local broadcast
//! addresses and runs one probe per address.
//!
//! # Usage
//!
//! ```no_run
//! use wxlib_station::discovery;
//! use std::net::SocketAddr;
//!
//! # async fn example() -> wxlib_core::Result<()> {
//! for broadcast in discovery::broadcast_addresses() {
//!     let target = SocketAddr::from((broadcast, discovery::DEFAULT_BROADCAST_PORT));
//!     match discovery::probe(target).await {
//!         Ok(station) => println!("{} at {}", station.name, station.address),
//!         Err(e) => eprintln!("{}: {}", target, e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use wxlib_core::error::{Error, Result};
use wxlib_core::types::StationAddress;
use wxlib_transport::UdpTransport;

use crate::frame;

/// UDP port the station listens on for search broadcasts.
pub const DEFAULT_BROADCAST_PORT: u16 = 46000;

/// How long to wait for a station to answer one probe.
///
/// Stations on the same segment answer within milliseconds; two seconds
/// bounds the cost of probing an interface with no station behind it.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Discovery payload layout: MAC(6) IPv4(4) port(2) nameLen(1) name(...).
const MIN_RESPONSE_PAYLOAD: usize = 13;

/// A station that answered a discovery probe.
#[derive(Debug, Clone)]
pub struct DiscoveredStation {
    /// Station MAC, dash-separated hex (informational only).
    pub mac: String,
    /// Where to fetch live data: the IPv4 address and TCP port the
    /// station embedded in its response.
    pub address: StationAddress,
    /// Display name configured on the station (ISO-8859-1 on the wire).
    pub name: String,
}

/// Collect the IPv4 broadcast address of every non-loopback interface.
///
/// Duplicates are removed (multiple addresses on one interface share a
/// broadcast address). Interface enumeration failures are logged and
/// yield an empty list rather than an error -- the next discovery tick
/// simply tries again.
pub fn broadcast_addresses() -> Vec<Ipv4Addr> {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::error!(error = %e, "Could not enumerate network interfaces");
            return Vec::new();
        }
    };

    let mut addresses = Vec::new();
    for interface in interfaces {
        if interface.is_loopback() {
            continue;
        }
        if let if_addrs::IfAddr::V4(v4) = interface.addr {
            if let Some(broadcast) = v4.broadcast {
                if !addresses.contains(&broadcast) {
                    addresses.push(broadcast);
                }
            }
        }
    }
    addresses
}

/// Probe one broadcast address for a station, waiting up to
/// [`RESPONSE_TIMEOUT`] for the answer.
pub async fn probe(target: SocketAddr) -> Result<DiscoveredStation> {
    probe_with_timeout(target, RESPONSE_TIMEOUT).await
}

/// Probe one broadcast address with an explicit response timeout.
///
/// Binds an ephemeral UDP socket, enables broadcast, sends the search
/// command, and waits for exactly one datagram. The answer is validated
/// as a short frame with command `0x12` before the address fields are
/// extracted.
pub async fn probe_with_timeout(target: SocketAddr, timeout: Duration) -> Result<DiscoveredStation> {
    let socket = UdpTransport::bind("0.0.0.0:0").await?;
    socket.set_broadcast(true)?;

    tracing::debug!(target = %target, "Probing for a weather station");
    socket.send_to(&frame::search_request(), target).await?;

    let mut buf = [0u8; 256];
    let (n, src) = socket.recv_from(&mut buf, timeout).await?;

    let station = parse_response(&buf[..n])?;
    tracing::info!(
        name = %station.name,
        mac = %station.mac,
        address = %station.address,
        responder = %src,
        "Found station"
    );
    Ok(station)
}

/// Parse a discovery response datagram.
///
/// Payload layout after the short-frame header:
/// `MAC(6) IPv4(4) port(2) nameLen(1) name(nameLen - 1)`.
fn parse_response(data: &[u8]) -> Result<DiscoveredStation> {
    let payload = frame::parse_short(data, frame::CMD_SEARCH)
        .map_err(|e| Error::Discovery(format!("{} (raw: {})", e, frame::hex_dump(data))))?;

    if payload.len() < MIN_RESPONSE_PAYLOAD {
        return Err(Error::Discovery(format!(
            "response payload too short: {} bytes (raw: {})",
            payload.len(),
            frame::hex_dump(data)
        )));
    }

    let mac = payload[..6]
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-");

    let ip = Ipv4Addr::new(payload[6], payload[7], payload[8], payload[9]);
    let port = frame::u16_be_at(payload, 10);

    // The advertised name length includes a trailing NUL the station
    // never sends in the usable payload.
    let name_len = usize::from(payload[12]).saturating_sub(1);
    let name_end = MIN_RESPONSE_PAYLOAD + name_len;
    if payload.len() < name_end {
        return Err(Error::Discovery(format!(
            "response truncated before station name: {} bytes, expected {} (raw: {})",
            payload.len(),
            name_end,
            frame::hex_dump(data)
        )));
    }

    // ISO-8859-1 bytes map one-to-one onto Unicode scalar values.
    let name: String = payload[MIN_RESPONSE_PAYLOAD..name_end]
        .iter()
        .map(|&b| char::from(b))
        .collect();

    Ok(DiscoveredStation {
        mac,
        address: StationAddress::new(ip, port),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{byte_sum, MAGIC};

    /// Build a device-shaped short response around `visible_payload`: the
    /// station's length field counts the whole datagram and the checksum
    /// is the last byte, after a trailing NUL.
    fn device_short_frame(cmd: u8, visible_payload: &[u8]) -> Vec<u8> {
        let declared = (visible_payload.len() + 7) as u16;
        let mut frame = vec![MAGIC, MAGIC, cmd];
        frame.extend_from_slice(&declared.to_be_bytes());
        frame.extend_from_slice(visible_payload);
        frame.push(0x00);
        let sum = byte_sum(&frame[2..]);
        frame.push(sum);
        frame
    }

    /// Payload for a well-formed discovery response.
    fn discovery_payload(name: &str) -> Vec<u8> {
        let mut payload = vec![0x00, 0x0E, 0xC6, 0x00, 0x07, 0x10]; // MAC
        payload.extend_from_slice(&[192, 168, 1, 42]); // IPv4
        payload.extend_from_slice(&45000u16.to_be_bytes()); // TCP port
        payload.push((name.len() + 1) as u8); // name length incl. NUL
        payload.extend_from_slice(name.as_bytes());
        payload
    }

    #[test]
    fn parse_well_formed_response() {
        let frame = device_short_frame(frame::CMD_SEARCH, &discovery_payload("WS980WiFi"));
        let station = parse_response(&frame).unwrap();

        assert_eq!(station.mac, "00-0E-C6-00-07-10");
        assert_eq!(station.address.ip, Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(station.address.port, 45000);
        assert_eq!(station.name, "WS980WiFi");
    }

    #[test]
    fn parse_response_latin1_name() {
        // 0xE9 is 'é' in ISO-8859-1 and not valid UTF-8 on its own.
        let mut payload = discovery_payload("");
        let name_bytes = [0x4D, 0xE9, 0x74, 0xE9, 0x6F]; // "Météo"
        payload[12] = (name_bytes.len() + 1) as u8;
        payload.extend_from_slice(&name_bytes);

        let frame = device_short_frame(frame::CMD_SEARCH, &payload);
        let station = parse_response(&frame).unwrap();
        assert_eq!(station.name, "Météo");
    }

    #[test]
    fn parse_response_payload_too_short() {
        // MAC and half the IP, nothing else.
        let frame = device_short_frame(frame::CMD_SEARCH, &[0x00; 8]);
        let err = parse_response(&frame).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn parse_response_truncated_before_name() {
        let mut payload = discovery_payload("WS980WiFi");
        payload.truncate(payload.len() - 4);
        let frame = device_short_frame(frame::CMD_SEARCH, &payload);
        let err = parse_response(&frame).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn parse_response_wrong_command() {
        let frame = device_short_frame(frame::CMD_VERSION, &discovery_payload("WS980WiFi"));
        let err = parse_response(&frame).unwrap_err();
        // Frame-level failures surface as Discovery errors with the raw
        // bytes attached.
        assert!(matches!(err, Error::Discovery(_)));
        assert!(err.to_string().contains("raw:"));
    }

    #[test]
    fn parse_response_garbage() {
        let err = parse_response(&[0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[tokio::test]
    async fn probe_against_loopback_responder() {
        // A scripted responder standing in for the station.
        let responder = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let responder_addr = responder.local_addr().unwrap();

        let response = device_short_frame(frame::CMD_SEARCH, &discovery_payload("Backyard"));
        let server = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (n, src) = responder.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], &frame::search_request()[..]);
            responder.send_to(&response, src).await.unwrap();
        });

        let station = probe(responder_addr).await.unwrap();
        assert_eq!(station.name, "Backyard");
        assert_eq!(station.address.ip, Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(station.address.port, 45000);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn probe_timeout_when_nothing_answers() {
        // Bind a socket that never responds.
        let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = silent.local_addr().unwrap();

        let result = probe_with_timeout(target, Duration::from_millis(50)).await;
        assert!(
            matches!(result, Err(Error::Timeout)),
            "expected Timeout, got: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn probe_rejects_truncated_response() {
        let responder = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let responder_addr = responder.local_addr().unwrap();

        let mut payload = discovery_payload("WS980WiFi");
        payload.truncate(10);
        let response = device_short_frame(frame::CMD_SEARCH, &payload);
        let server = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, src) = responder.recv_from(&mut buf).await.unwrap();
            responder.send_to(&response, src).await.unwrap();
        });

        let result = probe(responder_addr).await;
        assert!(matches!(result, Err(Error::Discovery(_))));

        server.await.unwrap();
    }

    #[test]
    fn broadcast_addresses_deduplicates_and_skips_loopback() {
        // Whatever the host configuration, the invariants hold: no
        // duplicates, and never the loopback broadcast.
        let addresses = broadcast_addresses();
        let mut deduped = addresses.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), addresses.len());
        assert!(!addresses.contains(&Ipv4Addr::new(127, 255, 255, 255)));
    }
}
