//! Sensor registry and value decoding.
//!
//! A live data payload is a sequence of `(sensor id, value bytes)` records.
//! This module is the static table that gives each id its meaning: encoded
//! width, physical unit, and decode rule. Ids are not contiguous -- the
//! station skips 13 and 15 -- so lookups go through [`Sensor::from_id`].
//!
//! Decoding never fails: a raw value outside a sensor's valid range decodes
//! to `0.0` and leaves a warning in the log, which is how the station
//! firmware itself signals "no sensor connected" (e.g. the `0x7FFF`
//! temperature sentinel).

use wxlib_core::types::Unit;

use crate::frame::{i8_at, i16_be_at, i32_be_at};

/// One physical measurement reported by the station.
///
/// The variant set mirrors the station firmware's sensor ids 1 through 23
/// (with gaps). Every variant is present in a fresh
/// [`StationState`](crate::state::StationState) from process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sensor {
    RoomTemperature,
    OutsideTemperature,
    DewPoint,
    ApparentTemperature,
    TemperatureHumidityIndex,
    RoomHumidity,
    OutsideHumidity,
    PressureAbsolute,
    PressureRelative,
    WindDirection,
    WindSpeed,
    GustSpeed,
    RainHour,
    RainDay,
    RainWeek,
    RainMonth,
    RainYear,
    RainTotal,
    Illuminance,
    UvRaw,
    UvIndex,
}

impl Sensor {
    /// Every sensor the station can report, in id order.
    pub const ALL: [Sensor; 21] = [
        Sensor::RoomTemperature,
        Sensor::OutsideTemperature,
        Sensor::DewPoint,
        Sensor::ApparentTemperature,
        Sensor::TemperatureHumidityIndex,
        Sensor::RoomHumidity,
        Sensor::OutsideHumidity,
        Sensor::PressureAbsolute,
        Sensor::PressureRelative,
        Sensor::WindDirection,
        Sensor::WindSpeed,
        Sensor::GustSpeed,
        Sensor::RainHour,
        Sensor::RainDay,
        Sensor::RainWeek,
        Sensor::RainMonth,
        Sensor::RainYear,
        Sensor::RainTotal,
        Sensor::Illuminance,
        Sensor::UvRaw,
        Sensor::UvIndex,
    ];

    /// The sensor-type byte this sensor is keyed by in a live data record.
    pub fn id(&self) -> u8 {
        match self {
            Sensor::RoomTemperature => 1,
            Sensor::OutsideTemperature => 2,
            Sensor::DewPoint => 3,
            Sensor::ApparentTemperature => 4,
            Sensor::TemperatureHumidityIndex => 5,
            Sensor::RoomHumidity => 6,
            Sensor::OutsideHumidity => 7,
            Sensor::PressureAbsolute => 8,
            Sensor::PressureRelative => 9,
            Sensor::WindDirection => 10,
            Sensor::WindSpeed => 11,
            Sensor::GustSpeed => 12,
            Sensor::RainHour => 14,
            Sensor::RainDay => 16,
            Sensor::RainWeek => 17,
            Sensor::RainMonth => 18,
            Sensor::RainYear => 19,
            Sensor::RainTotal => 20,
            Sensor::Illuminance => 21,
            Sensor::UvRaw => 22,
            Sensor::UvIndex => 23,
        }
    }

    /// Look up a sensor by its id byte. Ids 13 and 15 (and anything above
    /// 23) are unassigned and return `None`.
    pub fn from_id(id: u8) -> Option<Sensor> {
        match id {
            1 => Some(Sensor::RoomTemperature),
            2 => Some(Sensor::OutsideTemperature),
            3 => Some(Sensor::DewPoint),
            4 => Some(Sensor::ApparentTemperature),
            5 => Some(Sensor::TemperatureHumidityIndex),
            6 => Some(Sensor::RoomHumidity),
            7 => Some(Sensor::OutsideHumidity),
            8 => Some(Sensor::PressureAbsolute),
            9 => Some(Sensor::PressureRelative),
            10 => Some(Sensor::WindDirection),
            11 => Some(Sensor::WindSpeed),
            12 => Some(Sensor::GustSpeed),
            14 => Some(Sensor::RainHour),
            16 => Some(Sensor::RainDay),
            17 => Some(Sensor::RainWeek),
            18 => Some(Sensor::RainMonth),
            19 => Some(Sensor::RainYear),
            20 => Some(Sensor::RainTotal),
            21 => Some(Sensor::Illuminance),
            22 => Some(Sensor::UvRaw),
            23 => Some(Sensor::UvIndex),
            _ => None,
        }
    }

    /// The decode rule for this sensor's value bytes.
    pub fn kind(&self) -> DecodeKind {
        match self {
            Sensor::RoomTemperature
            | Sensor::OutsideTemperature
            | Sensor::DewPoint
            | Sensor::ApparentTemperature
            | Sensor::TemperatureHumidityIndex => DecodeKind::Temperature,
            Sensor::RoomHumidity | Sensor::OutsideHumidity => DecodeKind::Humidity,
            Sensor::PressureAbsolute | Sensor::PressureRelative => DecodeKind::Pressure,
            Sensor::WindDirection => DecodeKind::WindDirection,
            Sensor::WindSpeed | Sensor::GustSpeed => DecodeKind::WindSpeed,
            Sensor::RainHour
            | Sensor::RainDay
            | Sensor::RainWeek
            | Sensor::RainMonth
            | Sensor::RainYear
            | Sensor::RainTotal
            | Sensor::Illuminance => DecodeKind::Accumulated,
            Sensor::UvRaw => DecodeKind::UvRaw,
            Sensor::UvIndex => DecodeKind::UvIndex,
        }
    }

    /// Number of value bytes this sensor occupies in a live data record.
    pub fn width(&self) -> usize {
        self.kind().width()
    }

    /// The physical unit of the decoded value.
    pub fn unit(&self) -> Unit {
        match self {
            Sensor::RoomTemperature
            | Sensor::OutsideTemperature
            | Sensor::DewPoint
            | Sensor::ApparentTemperature
            | Sensor::TemperatureHumidityIndex => Unit::Temperature,
            Sensor::RoomHumidity | Sensor::OutsideHumidity => Unit::Humidity,
            Sensor::PressureAbsolute | Sensor::PressureRelative => Unit::Pressure,
            Sensor::WindDirection => Unit::Degree,
            Sensor::WindSpeed | Sensor::GustSpeed => Unit::Speed,
            Sensor::RainHour
            | Sensor::RainDay
            | Sensor::RainWeek
            | Sensor::RainMonth
            | Sensor::RainYear
            | Sensor::RainTotal => Unit::Millimeter,
            Sensor::Illuminance => Unit::Lux,
            Sensor::UvRaw => Unit::MicrowattsPerM2,
            Sensor::UvIndex => Unit::None,
        }
    }

    /// Decode this sensor's value from exactly [`width`](Sensor::width)
    /// raw bytes.
    pub fn decode(&self, raw: &[u8]) -> f64 {
        self.kind().decode(raw)
    }
}

/// Decode strategy for one family of sensors.
///
/// A small closed set rather than per-sensor function pointers: the
/// station reuses the same encoding for whole sensor families (all five
/// temperatures decode identically, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    /// 2 bytes signed, tenths of a degree; `0x7FFF` is the "no sensor"
    /// sentinel. There is no lower bound.
    Temperature,
    /// 1 byte signed, percent; valid range 0..=100.
    Humidity,
    /// 2 bytes signed, tenths of a hectopascal; negative or `0x7FFF` is
    /// invalid.
    Pressure,
    /// 2 bytes signed, m/s on the wire; negative or `0x7FFF` is invalid.
    /// Reported in km/h rounded to one decimal.
    WindSpeed,
    /// 2 bytes signed, compass degrees; valid range 0..=360.
    WindDirection,
    /// 4 bytes signed, tenths of a unit (rain counters, illuminance);
    /// valid range 0..=16_777_214.
    Accumulated,
    /// 2 bytes signed, µW/m²; negative or `0x7FFF` is invalid.
    UvRaw,
    /// 1 byte signed, dimensionless index; negative is invalid.
    UvIndex,
}

impl DecodeKind {
    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            DecodeKind::Humidity | DecodeKind::UvIndex => 1,
            DecodeKind::Temperature
            | DecodeKind::Pressure
            | DecodeKind::WindSpeed
            | DecodeKind::WindDirection
            | DecodeKind::UvRaw => 2,
            DecodeKind::Accumulated => 4,
        }
    }

    /// Decode a raw value.
    ///
    /// `raw` must be exactly [`width`](DecodeKind::width) bytes; the
    /// record walker checks this before calling. Out-of-range values
    /// decode to `0.0` with a warning.
    pub fn decode(&self, raw: &[u8]) -> f64 {
        match self {
            DecodeKind::Temperature => {
                let value = i16_be_at(raw, 0);
                if value == 32767 {
                    tracing::warn!(value, "Invalid temperature");
                    return 0.0;
                }
                f64::from(value) / 10.0
            }
            DecodeKind::Humidity => {
                let value = i8_at(raw, 0);
                if !(0..=100).contains(&value) {
                    tracing::warn!(value, "Invalid humidity");
                    return 0.0;
                }
                f64::from(value)
            }
            DecodeKind::Pressure => {
                let value = i16_be_at(raw, 0);
                if value < 0 || value == 32767 {
                    tracing::warn!(value, "Invalid pressure");
                    return 0.0;
                }
                f64::from(value) / 10.0
            }
            DecodeKind::WindSpeed => {
                let value = i16_be_at(raw, 0);
                if value < 0 || value == 32767 {
                    tracing::warn!(value, "Invalid wind speed");
                    return 0.0;
                }
                // The wire value is m/s; report km/h to one decimal.
                (f64::from(value) * 3.6).round() / 10.0
            }
            DecodeKind::WindDirection => {
                let value = i16_be_at(raw, 0);
                if !(0..=360).contains(&value) {
                    tracing::warn!(value, "Invalid wind direction");
                    return 0.0;
                }
                f64::from(value)
            }
            DecodeKind::Accumulated => {
                let value = i32_be_at(raw, 0);
                if !(0..=16_777_214).contains(&value) {
                    tracing::warn!(value, "Invalid accumulated value");
                    return 0.0;
                }
                f64::from(value) / 10.0
            }
            DecodeKind::UvRaw => {
                let value = i16_be_at(raw, 0);
                if value < 0 || value == 32767 {
                    tracing::warn!(value, "Invalid UV irradiance");
                    return 0.0;
                }
                f64::from(value)
            }
            DecodeKind::UvIndex => {
                let value = i8_at(raw, 0);
                if value < 0 {
                    tracing::warn!(value, "Invalid UV index");
                    return 0.0;
                }
                f64::from(value)
            }
        }
    }
}
