//! Response payload parsing for the MH-Z19C protocol.
//!
//! Each parser takes the response data region already truncated to the
//! command's response width.

use bytes::Buf;

use crate::error::FrameError;
use crate::types::{CalibState, FirmwareVersion, SensorReading, TEMPERATURE_OFFSET};

fn ensure_len(data: &[u8], expected: usize) -> Result<(), FrameError> {
    if data.len() < expected {
        return Err(FrameError::Incomplete {
            expected,
            got: data.len(),
        });
    }
    Ok(())
}

/// Parses a `ReadCo2` response.
///
/// Format:
/// ```text
/// [ppm:2BE] [temp+40:1]
/// ```
/// A zero temperature byte means the firmware does not report one.
pub fn parse_co2(data: &[u8]) -> Result<SensorReading, FrameError> {
    ensure_len(data, 3)?;

    let mut buf = data;
    let co2_ppm = buf.get_u16();
    let temp_raw = buf.get_u8();

    let temperature = if temp_raw == 0 {
        None
    } else {
        Some(i16::from(temp_raw) - TEMPERATURE_OFFSET)
    };

    Ok(SensorReading {
        co2_ppm,
        temperature,
    })
}

/// Parses a `ReadTemperature` response.
///
/// Format:
/// ```text
/// [unused:2] [centi-degrees:2BE]
/// ```
pub fn parse_temperature(data: &[u8]) -> Result<f32, FrameError> {
    ensure_len(data, 4)?;

    let mut buf = data;
    buf.advance(2);
    Ok(f32::from(buf.get_u16()) / 100.0)
}

/// Parses a `GetAutoCalib` response; byte 5 is the ABC flag.
pub fn parse_calib_state(data: &[u8]) -> Result<CalibState, FrameError> {
    ensure_len(data, 6)?;
    Ok(CalibState::from(data[5] != 0))
}

/// Parses a `GetVersion` response (four ASCII characters).
pub fn parse_version(data: &[u8]) -> Result<FirmwareVersion, FrameError> {
    ensure_len(data, 4)?;
    Ok(FirmwareVersion::from_bytes(&data[..4]))
}
