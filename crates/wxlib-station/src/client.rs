//! Live data fetch client.
//!
//! One fetch is a single short-lived TCP exchange: connect to the
//! station's data port, write the live data command, read the framed
//! response, and decode its `(sensor id, value bytes)` records into
//! [`StationState`]. Any failure ends the fetch; the poller simply tries
//! again on its next tick, and the known station address is never touched
//! from here (only discovery sets or clears it).

use std::time::Duration;

use wxlib_core::error::{Error, Result};
use wxlib_core::transport::Transport;
use wxlib_core::types::StationAddress;
use wxlib_transport::tcp::{TcpTransport, DEFAULT_CONNECT_TIMEOUT};

use crate::frame;
use crate::sensors::Sensor;
use crate::state::StationState;

/// Fetches the current-values snapshot from a station.
///
/// The configured timeout bounds the TCP connect *and* each read -- a
/// station that accepts the connection but stops talking cannot stall a
/// fetch tick for longer than one read timeout.
#[derive(Debug, Clone)]
pub struct StationClient {
    timeout: Duration,
}

impl StationClient {
    /// Create a client with the default 5-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with an explicit connect/read timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        StationClient { timeout }
    }

    /// Fetch the station's current values and store them in `state`.
    ///
    /// Opens a fresh TCP connection for the exchange and closes it before
    /// returning, whether or not the fetch succeeded.
    pub async fn fetch(&self, address: StationAddress, state: &StationState) -> Result<()> {
        tracing::debug!(station = %address, "Connecting to station");
        let mut transport =
            TcpTransport::connect_with_timeout(&address.to_string(), self.timeout).await?;

        let result = self.fetch_with_transport(&mut transport, state).await;
        let _ = transport.close().await;
        result
    }

    /// Run the live data exchange over an already-connected transport.
    ///
    /// Split out from [`fetch`](StationClient::fetch) so the protocol can
    /// be exercised against mock transports.
    pub async fn fetch_with_transport(
        &self,
        transport: &mut dyn Transport,
        state: &StationState,
    ) -> Result<()> {
        transport.send(&frame::live_data_request()).await?;

        // The response length is only known after the 5-byte header
        // prefix: magic(2) command(1) length(2).
        let mut header = [0u8; 5];
        read_exact(transport, &mut header, self.timeout).await?;

        let declared = usize::from(frame::u16_be_at(&header, 3));
        let remaining = declared.checked_sub(3).ok_or_else(|| {
            Error::Frame(format!("declared length too small: {}", declared))
        })?;

        let mut data = vec![0u8; 5 + remaining];
        data[..5].copy_from_slice(&header);
        read_exact(transport, &mut data[5..], self.timeout).await?;

        let payload = frame::parse_long(&data, frame::CMD_DATA, frame::SUB_LIVE_DATA)?;
        apply_records(payload, state)
    }
}

impl Default for StationClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Read until `buf` is full, applying `timeout` per read.
///
/// The station may deliver the frame in arbitrarily small chunks; a
/// closed connection mid-frame surfaces as
/// [`Error::ConnectionLost`](wxlib_core::Error::ConnectionLost) from the
/// transport.
async fn read_exact(
    transport: &mut dyn Transport,
    buf: &mut [u8],
    timeout: Duration,
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = transport.receive(&mut buf[filled..], timeout).await?;
        filled += n;
    }
    Ok(())
}

/// Walk the validated payload as `(sensor id, value bytes)` records and
/// overwrite the state entry for each known sensor.
///
/// There is no record count on the wire; the walk continues until the
/// payload is exhausted. An unknown sensor id ends the walk: the table
/// cannot know the unknown value's width, so every byte after it is
/// unattributable. Values decoded before the unknown id are kept.
fn apply_records(payload: &[u8], state: &StationState) -> Result<()> {
    let mut pos = 0;
    while pos < payload.len() {
        let id = payload[pos];
        pos += 1;

        let sensor = match Sensor::from_id(id) {
            Some(sensor) => sensor,
            None => {
                tracing::warn!(
                    id,
                    remaining = payload.len() - pos,
                    "Unknown sensor id, dropping the rest of the record stream"
                );
                break;
            }
        };

        let width = sensor.width();
        if pos + width > payload.len() {
            return Err(Error::Frame(format!(
                "truncated record for sensor {:?}: need {} bytes, {} left",
                sensor,
                width,
                payload.len() - pos
            )));
        }

        let value = sensor.decode(&payload[pos..pos + width]);
        state.set_value(sensor, value);
        tracing::trace!(sensor = ?sensor, value, "Decoded sensor value");
        pos += width;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Build a live data response frame from raw records.
    fn live_data_response(records: &[u8]) -> Vec<u8> {
        let mut sub_payload = vec![frame::SUB_LIVE_DATA];
        sub_payload.extend_from_slice(records);
        frame::build_long_command(frame::CMD_DATA, &sub_payload)
    }

    /// Spawn a one-shot station: accept a connection, read the request,
    /// send `response`, close.
    async fn spawn_station(response: Vec<u8>) -> (tokio::task::JoinHandle<()>, StationAddress) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            stream.read_exact(&mut request).await.unwrap();
            assert_eq!(&request, &frame::live_data_request()[..]);
            stream.write_all(&response).await.unwrap();
            stream.flush().await.unwrap();
        });
        let station = StationAddress::new(std::net::Ipv4Addr::LOCALHOST, addr.port());
        (handle, station)
    }

    #[tokio::test]
    async fn fetch_updates_known_sensors_only() {
        // RoomHumidity (id 6) = 0x32 -> 50.0, OutsideTemperature (id 2)
        // = 0x00DA -> 21.8.
        let response = live_data_response(&[0x06, 0x32, 0x02, 0x00, 0xDA]);
        let (server, address) = spawn_station(response).await;

        let state = StationState::new();
        let client = StationClient::new();
        client.fetch(address, &state).await.unwrap();

        assert_eq!(state.value(Sensor::RoomHumidity), 50.0);
        assert_eq!(state.value(Sensor::OutsideTemperature), 21.8);
        for sensor in Sensor::ALL {
            if sensor != Sensor::RoomHumidity && sensor != Sensor::OutsideTemperature {
                assert_eq!(state.value(sensor), 0.0, "{:?} should be untouched", sensor);
            }
        }

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_full_record_set() {
        // One record per sensor family width: temperature, humidity,
        // wind, a 4-byte rain counter, and the UV index.
        let response = live_data_response(&[
            0x02, 0x00, 0xDA, // OutsideTemperature = 21.8
            0x07, 0x41, // OutsideHumidity = 65.0
            0x0B, 0x00, 0x0A, // WindSpeed: 10 m/s -> 3.6 km/h
            0x14, 0x00, 0x00, 0x01, 0x00, // RainTotal = 25.6
            0x17, 0x05, // UvIndex = 5.0
        ]);
        let (server, address) = spawn_station(response).await;

        let state = StationState::new();
        StationClient::new().fetch(address, &state).await.unwrap();

        assert_eq!(state.value(Sensor::OutsideTemperature), 21.8);
        assert_eq!(state.value(Sensor::OutsideHumidity), 65.0);
        assert_eq!(state.value(Sensor::WindSpeed), 3.6);
        assert_eq!(state.value(Sensor::RainTotal), 25.6);
        assert_eq!(state.value(Sensor::UvIndex), 5.0);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_aborts_record_walk_on_unknown_id() {
        // Valid humidity record, then id 13 (unassigned) followed by
        // bytes that would decode to 21.8 if misread as a temperature
        // record.
        let response = live_data_response(&[0x06, 0x32, 0x0D, 0x02, 0x00, 0xDA]);
        let (server, address) = spawn_station(response).await;

        let state = StationState::new();
        StationClient::new().fetch(address, &state).await.unwrap();

        assert_eq!(state.value(Sensor::RoomHumidity), 50.0);
        // The bytes after the unknown id were dropped, not decoded.
        assert_eq!(state.value(Sensor::OutsideTemperature), 0.0);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_rejects_truncated_record() {
        // OutsideTemperature wants 2 value bytes, only 1 present.
        let response = live_data_response(&[0x06, 0x32, 0x02, 0x00]);
        let (server, address) = spawn_station(response).await;

        let state = StationState::new();
        let err = StationClient::new().fetch(address, &state).await.unwrap_err();
        assert!(matches!(err, Error::Frame(_)));
        assert!(err.to_string().contains("truncated record"));

        // Records before the truncation were applied (per-record writes).
        assert_eq!(state.value(Sensor::RoomHumidity), 50.0);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_rejects_corrupted_checksum() {
        let mut response = live_data_response(&[0x06, 0x32]);
        let last = response.len() - 1;
        response[last] ^= 0x01;
        let (server, address) = spawn_station(response).await;

        let state = StationState::new();
        let err = StationClient::new().fetch(address, &state).await.unwrap_err();
        assert!(matches!(err, Error::Frame(_)));
        assert_eq!(state.value(Sensor::RoomHumidity), 0.0);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_fails_when_station_closes_mid_frame() {
        // Station sends only the first 3 bytes of the header then closes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            stream.read_exact(&mut request).await.unwrap();
            stream.write_all(&[0xFF, 0xFF, 0x0B]).await.unwrap();
            stream.flush().await.unwrap();
        });

        let state = StationState::new();
        let address = StationAddress::new(std::net::Ipv4Addr::LOCALHOST, addr.port());
        let client = StationClient::with_timeout(Duration::from_millis(500));
        let err = client.fetch(address, &state).await.unwrap_err();
        assert!(
            matches!(err, Error::ConnectionLost | Error::Timeout),
            "expected ConnectionLost or Timeout, got: {:?}",
            err
        );

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_fails_fast_on_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let state = StationState::new();
        let address = StationAddress::new(std::net::Ipv4Addr::LOCALHOST, addr.port());
        let err = StationClient::new().fetch(address, &state).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_) | Error::Io(_)));
    }

    #[tokio::test]
    async fn fetch_handles_chunked_delivery() {
        // The station is free to trickle the frame byte by byte.
        let response = live_data_response(&[0x02, 0x00, 0xDA]);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            stream.read_exact(&mut request).await.unwrap();
            for byte in response {
                stream.write_all(&[byte]).await.unwrap();
                stream.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });

        let state = StationState::new();
        let address = StationAddress::new(std::net::Ipv4Addr::LOCALHOST, addr.port());
        StationClient::new().fetch(address, &state).await.unwrap();
        assert_eq!(state.value(Sensor::OutsideTemperature), 21.8);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn declared_header_length_below_minimum_is_a_frame_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 8];
            stream.read_exact(&mut request).await.unwrap();
            // Header declaring length 2: less than the header itself.
            stream.write_all(&[0xFF, 0xFF, 0x0B, 0x00, 0x02]).await.unwrap();
            stream.flush().await.unwrap();
        });

        let state = StationState::new();
        let address = StationAddress::new(std::net::Ipv4Addr::LOCALHOST, addr.port());
        let err = StationClient::new().fetch(address, &state).await.unwrap_err();
        assert!(matches!(err, Error::Frame(_)));

        server.await.unwrap();
    }
}
