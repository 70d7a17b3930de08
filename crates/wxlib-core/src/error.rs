//! Error types for wxlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, frame-layer, and
//! discovery errors are all captured here.

/// The error type for all wxlib operations.
///
/// Variants cover the full range of failure modes encountered when talking
/// to a weather station on the local network: socket failures, malformed or
/// checksum-mismatched frames, timeouts, and bad discovery responses. None
/// of these are fatal to a polling process -- every one is caught at the
/// tick boundary, logged, and retried on the next scheduled tick.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (UDP socket, TCP connect, read/write).
    #[error("transport error: {0}")]
    Transport(String),

    /// A malformed station frame: bad magic bytes, unexpected command or
    /// sub-command, inconsistent length field, or a byte-sum checksum
    /// mismatch.
    #[error("frame error: {0}")]
    Frame(String),

    /// A short or otherwise malformed discovery response.
    ///
    /// Carries the raw datagram bytes in hex so a misbehaving station can
    /// be diagnosed from the logs alone.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Timed out waiting for data from the station.
    ///
    /// This typically means the station is powered off, has left the
    /// network, or a discovery broadcast went unanswered. It is a normal,
    /// recoverable condition.
    #[error("timeout waiting for station")]
    Timeout,

    /// No connection to the station has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the station was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
