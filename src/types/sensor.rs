//! Sensor value types.

use std::fmt;
use std::str::FromStr;

/// Offset applied to the raw temperature byte of a CO2 reading.
pub const TEMPERATURE_OFFSET: i16 = 40;

/// Upper bound of the MH-Z19C detection range, in ppm.
pub const MAX_PPM: u16 = 5000;

/// Result of a CO2 read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    /// CO2 concentration in ppm.
    pub co2_ppm: u16,
    /// Integer temperature in °C, if the firmware reports one.
    pub temperature: Option<i16>,
}

impl SensorReading {
    /// Returns true if the concentration lies in the documented range.
    #[must_use]
    pub const fn in_range(&self) -> bool {
        self.co2_ppm <= MAX_PPM
    }
}

/// Automatic baseline correction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibState {
    On,
    Off,
}

impl CalibState {
    /// Returns true if calibration is enabled.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for CalibState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl From<CalibState> for bool {
    fn from(state: CalibState) -> Self {
        state.is_on()
    }
}

impl fmt::Display for CalibState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
        })
    }
}

impl FromStr for CalibState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(format!("invalid calibration state '{other}', expected on or off")),
        }
    }
}

/// Firmware version reported by `GetVersion`, e.g. `"0502"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirmwareVersion(String);

impl FirmwareVersion {
    /// Builds a version from raw response bytes.
    ///
    /// Non-printable bytes (including NUL padding) are dropped.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(
            bytes
                .iter()
                .filter(|b| b.is_ascii_graphic())
                .map(|&b| char::from(b))
                .collect(),
        )
    }

    /// Returns the version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
