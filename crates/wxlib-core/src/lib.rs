//! wxlib-core: Core traits, types, and error definitions for wxlib.
//!
//! This crate defines the station-agnostic abstractions the rest of the
//! workspace builds on. Applications that only read decoded values depend
//! on these types without pulling in any socket code.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel to a station
//! - [`Unit`] -- physical unit of a decoded measurement
//! - [`StationAddress`] -- where a discovered station lives on the LAN
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use wxlib_core::*`.
pub use error::{Error, Result};
pub use transport::Transport;
pub use types::{StationAddress, Unit};
