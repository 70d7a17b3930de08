//! wxlib-station: the WS980-class weather station protocol driver.
//!
//! Everything specific to the station's wire protocol lives here, layered
//! leaf-first:
//!
//! - [`frame`] -- short/long frame construction and validation, byte-sum
//!   checksums, big-endian read primitives
//! - [`sensors`] -- the static registry mapping sensor-type bytes to
//!   widths, units, and decode rules
//! - [`discovery`] -- UDP broadcast search for a station on the LAN
//! - [`client`] -- TCP fetch of the current-values snapshot
//! - [`state`] -- the shared station address and latest readings
//! - [`poller`] -- the two fixed-rate timers that tie it all together
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wxlib_station::poller::StationPollerBuilder;
//! use wxlib_station::sensors::Sensor;
//! use wxlib_station::state::StationState;
//!
//! # async fn example() {
//! let state = Arc::new(StationState::new());
//! let poller = StationPollerBuilder::new().start(Arc::clone(&state));
//!
//! // Later, from any task or thread:
//! let outside = state.value(Sensor::OutsideTemperature);
//! println!("outside: {} {}", outside, Sensor::OutsideTemperature.unit());
//!
//! poller.shutdown().await;
//! # }
//! ```

pub mod client;
pub mod discovery;
pub mod frame;
pub mod poller;
pub mod sensors;
pub mod state;

pub use client::StationClient;
pub use discovery::{DiscoveredStation, DEFAULT_BROADCAST_PORT};
pub use poller::{StationPoller, StationPollerBuilder};
pub use sensors::{DecodeKind, Sensor};
pub use state::StationState;
