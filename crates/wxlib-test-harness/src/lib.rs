//! wxlib-test-harness: test utilities for wxlib.
//!
//! This crate provides [`MockStation`], a scripted loopback stand-in for
//! a WS980-class weather station, enabling deterministic testing of the
//! discovery and fetch paths without real hardware on the network.

pub mod mock_station;

pub use mock_station::MockStation;
