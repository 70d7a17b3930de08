//! Shared station state: the known station address and the latest
//! decoded value per sensor.
//!
//! One `StationState` (typically behind an [`Arc`](std::sync::Arc)) is
//! shared by the discovery task, the fetch task, and any number of
//! readers. Locking is deliberately explicit:
//!
//! - the station address is a `Mutex<Option<StationAddress>>`; readers
//!   take the lock, copy the pair out, and release -- there is no way to
//!   observe a torn ip/port pair;
//! - the readings map is an `RwLock`; the fetch task is the sole writer
//!   and takes the write lock once per decoded record, so a reader
//!   polling mid-fetch may see a partially updated tick. That weak
//!   consistency is inherent to the per-record update model and is part
//!   of this type's contract, not an accident.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use wxlib_core::types::StationAddress;

use crate::sensors::Sensor;

/// Latest known station address and sensor values.
///
/// Every [`Sensor`] is present from construction, initialized to `0.0`,
/// and only ever overwritten -- a reader always gets a complete map.
#[derive(Debug)]
pub struct StationState {
    station: Mutex<Option<StationAddress>>,
    readings: RwLock<HashMap<Sensor, f64>>,
}

impl StationState {
    /// Create a state with no known station and all sensors at `0.0`.
    pub fn new() -> Self {
        let mut readings = HashMap::with_capacity(Sensor::ALL.len());
        for sensor in Sensor::ALL {
            readings.insert(sensor, 0.0);
        }
        StationState {
            station: Mutex::new(None),
            readings: RwLock::new(readings),
        }
    }

    /// Record a discovered station address.
    pub fn set_station(&self, address: StationAddress) {
        let mut station = self.station.lock().unwrap_or_else(|e| e.into_inner());
        *station = Some(address);
    }

    /// Forget the known station address.
    ///
    /// Called after a failed discovery attempt; the fetch task skips its
    /// ticks until discovery succeeds again.
    pub fn clear_station(&self) {
        let mut station = self.station.lock().unwrap_or_else(|e| e.into_inner());
        *station = None;
    }

    /// Copy out the currently known station address, if any.
    pub fn station(&self) -> Option<StationAddress> {
        *self.station.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Overwrite the latest value for one sensor.
    pub fn set_value(&self, sensor: Sensor, value: f64) {
        let mut readings = self.readings.write().unwrap_or_else(|e| e.into_inner());
        readings.insert(sensor, value);
    }

    /// The latest value for one sensor.
    pub fn value(&self, sensor: Sensor) -> f64 {
        let readings = self.readings.read().unwrap_or_else(|e| e.into_inner());
        readings.get(&sensor).copied().unwrap_or(0.0)
    }

    /// Snapshot of all current values.
    ///
    /// The snapshot is complete (one entry per sensor) but, if taken while
    /// a fetch tick is writing, may mix values from the current and the
    /// previous tick.
    pub fn current_values(&self) -> HashMap<Sensor, f64> {
        let readings = self.readings.read().unwrap_or_else(|e| e.into_inner());
        readings.clone()
    }
}

impl Default for StationState {
    fn default() -> Self {
        Self::new()
    }
}
