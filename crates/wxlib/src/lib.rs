//! # wxlib -- LAN polling for WiFi weather stations
//!
//! `wxlib` is an asynchronous Rust library for reading WS980-class
//! consumer weather stations over the local network. It discovers the
//! station with a UDP broadcast, fetches a binary sensor snapshot over
//! TCP, decodes it into unit-tagged physical values, and keeps the latest
//! value per sensor in a concurrently readable store.
//!
//! ## Quick Start
//!
//! Add `wxlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! wxlib = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Start the poller and read values:
//!
//! ```no_run
//! use std::sync::Arc;
//! use wxlib::station::poller::StationPollerBuilder;
//! use wxlib::station::sensors::Sensor;
//! use wxlib::station::state::StationState;
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = Arc::new(StationState::new());
//!     let poller = StationPollerBuilder::new().start(Arc::clone(&state));
//!
//!     // Values refresh in the background; read them whenever.
//!     let outside = state.value(Sensor::OutsideTemperature);
//!     println!("outside: {} °C", outside);
//!
//!     poller.shutdown().await;
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                | Purpose                                          |
//! |----------------------|--------------------------------------------------|
//! | `wxlib-core`         | [`Transport`] trait, types, errors               |
//! | `wxlib-transport`    | TCP and UDP transport implementations            |
//! | `wxlib-station`      | Frame codec, sensor table, discovery, fetch, poller |
//! | `wxlib-test-harness` | Scripted mock station for tests                  |
//! | **`wxlib`**          | This facade crate -- re-exports everything       |
//!
//! ## Protocol
//!
//! The station speaks a compact binary protocol with `0xFFFF` magic bytes
//! and byte-sum checksums:
//!
//! - **Discovery**: a short frame (command `0x12`) broadcast to UDP port
//!   46000; the station answers with its MAC, IPv4 address, TCP port, and
//!   name.
//! - **Live data**: a long frame (command `0x0B`, sub-command `0x04`)
//!   over TCP; the response payload is a run of `(sensor id, value)`
//!   records decoded through the static sensor table.
//!
//! See [`station::frame`] for the exact wire formats and
//! [`station::sensors`] for the decode and validity rules.

pub use wxlib_core::*;

/// Station protocol: frame codec, sensor table, discovery, fetch client,
/// shared state, and the poller.
pub mod station {
    pub use wxlib_station::*;
}

/// TCP and UDP transport implementations.
pub mod transport {
    pub use wxlib_transport::*;
}
