//! Station frame encoder/decoder.
//!
//! WS980-class stations speak a compact binary protocol over both UDP
//! (discovery) and TCP (live data). This module handles the pure
//! byte-level construction and validation of those frames, plus the
//! big-endian read primitives the sensor table decodes values with.
//!
//! # Frame formats
//!
//! Short frame (discovery, firmware version -- one checksum):
//!
//! ```text
//! 0xFF 0xFF <cmd> <len:2> <payload...> <sum>
//! ```
//!
//! Long frame (live data -- sub-command and two checksums):
//!
//! ```text
//! 0xFF 0xFF <cmd> <len:2> <sub> <payload...> <sumPayload> <sumFrame>
//! ```
//!
//! All multi-byte integers are big-endian. The checksums are byte-sum
//! checksums: unsigned 8-bit wraparound addition over a byte range, not a
//! CRC polynomial.
//!
//! # Length-field asymmetry
//!
//! The firmware is not self-consistent about what the short-frame length
//! field covers. Commands we *build* count the command byte plus three
//! (matching captures of what stock clients send); responses the station
//! *sends* count the whole datagram, place the checksum at `len - 1`, and
//! carry one trailing byte (the station name's NUL) that is not part of
//! the usable payload -- hence the `len - 7` payload arithmetic in
//! [`parse_short`]. A built short command therefore does not survive
//! [`parse_short`]; device-shaped responses do. Long frames are symmetric
//! and round-trip cleanly.

use bytes::{BufMut, BytesMut};
use wxlib_core::error::{Error, Result};

/// Magic marker byte, repeated twice at the start of every frame.
pub const MAGIC: u8 = 0xFF;

/// Discovery search command.
pub const CMD_SEARCH: u8 = 0x12;

/// Firmware version query command.
pub const CMD_VERSION: u8 = 0x50;

/// Live data command (used with [`SUB_LIVE_DATA`]).
pub const CMD_DATA: u8 = 0x0B;

/// Sub-command selecting the current-values snapshot.
pub const SUB_LIVE_DATA: u8 = 0x04;

/// Compute the byte-sum checksum over a byte range.
///
/// Unsigned 8-bit wraparound addition -- equivalent to the sum of all
/// bytes modulo 256. This is the only integrity check the station
/// protocol uses.
pub fn byte_sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Build a short command frame for `cmd`.
///
/// Produces `[FF FF cmd lenHi lenLo sum]` where the length field counts
/// the command byte plus three and `sum` is the byte-sum over
/// `[cmd, lenHi, lenLo]`.
///
/// # Example
///
/// ```
/// use wxlib_station::frame::{build_short_command, CMD_SEARCH};
///
/// assert_eq!(
///     build_short_command(CMD_SEARCH),
///     vec![0xFF, 0xFF, 0x12, 0x00, 0x04, 0x16]
/// );
/// ```
pub fn build_short_command(cmd: u8) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(6);
    buf.put_u8(MAGIC);
    buf.put_u8(MAGIC);
    buf.put_u8(cmd);
    // The command byte counts toward the length; the magic bytes do not.
    buf.put_u16(4);
    let sum = byte_sum(&buf[2..]);
    buf.put_u8(sum);
    buf.to_vec()
}

/// Build a long command frame for `cmd` with the given sub-payload.
///
/// `sub_payload` starts with the sub-command byte and may carry extra
/// bytes after it. Produces
/// `[FF FF cmd lenHi lenLo sub_payload... sumPayload sumFrame]` where the
/// length field is `sub_payload.len() + 5`, `sumPayload` is the byte-sum
/// over `sub_payload`, and `sumFrame` is the byte-sum over everything
/// after the magic bytes (including `sumPayload`).
///
/// # Example
///
/// ```
/// use wxlib_station::frame::{build_long_command, CMD_DATA, SUB_LIVE_DATA};
///
/// assert_eq!(
///     build_long_command(CMD_DATA, &[SUB_LIVE_DATA]),
///     vec![0xFF, 0xFF, 0x0B, 0x00, 0x06, 0x04, 0x04, 0x19]
/// );
/// ```
pub fn build_long_command(cmd: u8, sub_payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(sub_payload.len() + 7);
    buf.put_u8(MAGIC);
    buf.put_u8(MAGIC);
    buf.put_u8(cmd);
    buf.put_u16((sub_payload.len() + 5) as u16);
    buf.put_slice(sub_payload);
    buf.put_u8(byte_sum(sub_payload));
    let sum = byte_sum(&buf[2..]);
    buf.put_u8(sum);
    buf.to_vec()
}

/// The canned discovery search request (`FF FF 12 00 04 16`).
pub fn search_request() -> Vec<u8> {
    build_short_command(CMD_SEARCH)
}

/// The canned firmware version request (`FF FF 50 00 04 54`).
pub fn version_request() -> Vec<u8> {
    build_short_command(CMD_VERSION)
}

/// The canned live data request (`FF FF 0B 00 06 04 04 19`).
pub fn live_data_request() -> Vec<u8> {
    build_long_command(CMD_DATA, &[SUB_LIVE_DATA])
}

/// Validate a short frame and return its payload slice.
///
/// Fails with [`Error::Frame`] if the buffer is shorter than six bytes,
/// the magic bytes are wrong, the command byte is not `expected_cmd`, the
/// declared length exceeds the buffer or is below the protocol minimum,
/// or the trailing byte-sum checksum does not match.
///
/// The payload is `declared_length - 7` bytes starting at offset 5; see
/// the module docs for why the station's trailing byte is excluded.
pub fn parse_short(data: &[u8], expected_cmd: u8) -> Result<&[u8]> {
    if data.len() < 6 {
        return Err(Error::Frame(format!("message too short: {} bytes", data.len())));
    }

    let magic = u16_be_at(data, 0);
    if magic != 0xFFFF {
        return Err(Error::Frame(format!("invalid magic: {:#06x}", magic)));
    }

    let command = u8_at(data, 2);
    if command != expected_cmd {
        return Err(Error::Frame(format!(
            "invalid command: {:#04x}, expected {:#04x}",
            command, expected_cmd
        )));
    }

    let declared = u16_be_at(data, 3) as usize;
    if data.len() < declared {
        return Err(Error::Frame(format!(
            "message too short: {} bytes, declared {}",
            data.len(),
            declared
        )));
    }
    if declared < 4 {
        return Err(Error::Frame(format!("declared length too small: {}", declared)));
    }
    // declared in 4..7 would put the checksum inside the header; the
    // station never sends such frames.
    if declared < 7 {
        return Err(Error::Frame(format!(
            "declared length too small for a response: {}",
            declared
        )));
    }

    let payload_len = declared - 7;
    let sum_pos = 6 + payload_len;
    let computed = byte_sum(&data[2..sum_pos]);
    let stored = data[sum_pos];
    if computed != stored {
        return Err(Error::Frame(format!(
            "checksum mismatch: computed {:#04x}, stored {:#04x}",
            computed, stored
        )));
    }

    Ok(&data[5..5 + payload_len])
}

/// Validate a long frame and return its payload slice.
///
/// Fails with [`Error::Frame`] if the buffer is shorter than eight bytes,
/// the magic bytes are wrong, the command or sub-command bytes do not
/// match, the declared length is inconsistent with the buffer, or either
/// checksum (sub-command+payload, then the whole frame body) mismatches.
///
/// The payload is the `declared_length - 6` bytes after the sub-command.
/// `parse_long` is the exact inverse of [`build_long_command`].
pub fn parse_long(data: &[u8], expected_cmd: u8, expected_sub: u8) -> Result<&[u8]> {
    if data.len() < 8 {
        return Err(Error::Frame(format!("message too short: {} bytes", data.len())));
    }

    let magic = u16_be_at(data, 0);
    if magic != 0xFFFF {
        return Err(Error::Frame(format!("invalid magic: {:#06x}", magic)));
    }

    let command = u8_at(data, 2);
    if command != expected_cmd {
        return Err(Error::Frame(format!(
            "invalid command: {:#04x}, expected {:#04x}",
            command, expected_cmd
        )));
    }

    let declared = u16_be_at(data, 3) as usize;
    if data.len() < declared + 2 {
        return Err(Error::Frame(format!(
            "message too short: {} bytes, expected {}",
            data.len(),
            declared + 2
        )));
    }
    if declared < 6 {
        return Err(Error::Frame(format!("declared length too small: {}", declared)));
    }

    let sub = u8_at(data, 5);
    if sub != expected_sub {
        return Err(Error::Frame(format!(
            "invalid sub-command: {:#04x}, expected {:#04x}",
            sub, expected_sub
        )));
    }

    let payload_len = declared - 6;
    let sum_pos = 6 + payload_len;

    let payload_sum = byte_sum(&data[5..sum_pos]);
    if payload_sum != data[sum_pos] {
        return Err(Error::Frame(format!(
            "payload checksum mismatch: computed {:#04x}, stored {:#04x}",
            payload_sum, data[sum_pos]
        )));
    }

    let frame_sum = byte_sum(&data[2..sum_pos + 1]);
    if frame_sum != data[sum_pos + 1] {
        return Err(Error::Frame(format!(
            "frame checksum mismatch: computed {:#04x}, stored {:#04x}",
            frame_sum, data[sum_pos + 1]
        )));
    }

    Ok(&data[6..sum_pos])
}

/// Read an unsigned byte at `pos`.
///
/// Like all the read primitives below, the caller is responsible for the
/// bounds check; the sensor table and the parsers only call these after
/// validating the record width against the remaining payload.
pub fn u8_at(data: &[u8], pos: usize) -> u8 {
    data[pos]
}

/// Read a signed byte at `pos`.
pub fn i8_at(data: &[u8], pos: usize) -> i8 {
    data[pos] as i8
}

/// Read an unsigned big-endian 16-bit value at `pos`.
pub fn u16_be_at(data: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([data[pos], data[pos + 1]])
}

/// Read a signed big-endian 16-bit value at `pos`.
pub fn i16_be_at(data: &[u8], pos: usize) -> i16 {
    i16::from_be_bytes([data[pos], data[pos + 1]])
}

/// Read a signed big-endian 32-bit value at `pos`.
pub fn i32_be_at(data: &[u8], pos: usize) -> i32 {
    i32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Format bytes as space-separated hex pairs for log output.
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
