//! Shared types for wxlib.
//!
//! These are the station-agnostic value types that flow between the
//! protocol layer and applications: the physical unit of a measurement and
//! the network address of a discovered station.

use std::fmt;
use std::net::Ipv4Addr;

/// The physical unit of a decoded sensor value.
///
/// This is a closed set: WS980-class stations report exactly these
/// measurement kinds. `None` is used for dimensionless readings such as
/// the UV index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Degrees Celsius, one decimal place.
    Temperature,
    /// Hectopascal, one decimal place.
    Pressure,
    /// Relative humidity in percent.
    Humidity,
    /// Compass degrees, 0..=360.
    Degree,
    /// Kilometres per hour (converted from the station's m/s).
    Speed,
    /// Millimetres of precipitation.
    Millimeter,
    /// Illuminance in lux.
    Lux,
    /// Ultraviolet irradiance in microwatts per square metre.
    MicrowattsPerM2,
    /// Dimensionless.
    None,
}

impl Unit {
    /// The plain (unlocalized) symbol for this unit.
    ///
    /// Human-readable, localized names are the business of whatever serves
    /// the values to users; this is just enough for logs and examples.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Temperature => "°C",
            Unit::Pressure => "hPa",
            Unit::Humidity => "%",
            Unit::Degree => "°",
            Unit::Speed => "km/h",
            Unit::Millimeter => "mm",
            Unit::Lux => "lx",
            Unit::MicrowattsPerM2 => "µW/m²",
            Unit::None => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The IPv4 address and TCP port of a weather station on the LAN.
///
/// Produced by discovery (the station embeds its own address in the
/// discovery response) and consumed by the fetch client. A station address
/// is always read and written as a pair -- see `StationState` in
/// `wxlib-station` for the locking discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationAddress {
    /// IPv4 address of the station.
    pub ip: Ipv4Addr,
    /// TCP port the station serves live data on.
    pub port: u16,
}

impl StationAddress {
    /// Create a station address from an IP and port.
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        StationAddress { ip, port }
    }
}

impl fmt::Display for StationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_symbols() {
        assert_eq!(Unit::Temperature.symbol(), "°C");
        assert_eq!(Unit::Pressure.symbol(), "hPa");
        assert_eq!(Unit::Humidity.symbol(), "%");
        assert_eq!(Unit::Degree.symbol(), "°");
        assert_eq!(Unit::Speed.symbol(), "km/h");
        assert_eq!(Unit::Millimeter.symbol(), "mm");
        assert_eq!(Unit::Lux.symbol(), "lx");
        assert_eq!(Unit::MicrowattsPerM2.symbol(), "µW/m²");
        assert_eq!(Unit::None.symbol(), "");
    }

    #[test]
    fn unit_display_matches_symbol() {
        assert_eq!(Unit::Speed.to_string(), "km/h");
        assert_eq!(Unit::None.to_string(), "");
    }

    #[test]
    fn station_address_display() {
        let addr = StationAddress::new(Ipv4Addr::new(192, 168, 1, 42), 45000);
        assert_eq!(addr.to_string(), "192.168.1.42:45000");
    }

    #[test]
    fn station_address_is_copy_eq() {
        let a = StationAddress::new(Ipv4Addr::new(10, 0, 0, 1), 45000);
        let b = a;
        assert_eq!(a, b);
    }
}
