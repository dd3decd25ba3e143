//! Data types returned by sensor commands.

pub mod sensor;

pub use sensor::{CalibState, FirmwareVersion, MAX_PPM, SensorReading, TEMPERATURE_OFFSET};
