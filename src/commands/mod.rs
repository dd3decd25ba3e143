//! Command handlers for sensor operations.
//!
//! Each command is one exchange with a fixed opcode, plus a typed reading
//! of the response. Errors from the exchange abort the command unchanged;
//! retrying is left entirely to the transceiver's read loop.

use crate::error::Result;
use crate::protocol::{
    CALIB_OFF, CALIB_ON, Command, parse_calib_state, parse_co2, parse_temperature, parse_version,
};
use crate::transceiver::Transceiver;
use crate::transport::Channel;
use crate::types::{CalibState, FirmwareVersion, SensorReading};

/// Command handler for sensor operations.
pub struct CommandHandler<C> {
    transceiver: Transceiver<C>,
}

impl<C: Channel> CommandHandler<C> {
    /// Creates a new command handler.
    #[must_use]
    pub const fn new(transceiver: Transceiver<C>) -> Self {
        Self { transceiver }
    }

    /// Returns the underlying transceiver.
    #[must_use]
    pub const fn transceiver(&self) -> &Transceiver<C> {
        &self.transceiver
    }

    /// Returns the underlying transceiver mutably.
    pub fn transceiver_mut(&mut self) -> &mut Transceiver<C> {
        &mut self.transceiver
    }

    /// Reads CO2 concentration and the integer temperature (0x86).
    pub async fn read_co2(&mut self) -> Result<SensorReading> {
        let data = self.transceiver.exchange(Command::ReadCo2, &[]).await?;
        Ok(parse_co2(&data)?)
    }

    /// Reads temperature in °C with two decimals (0x85, undocumented).
    pub async fn read_temperature(&mut self) -> Result<f32> {
        let data = self
            .transceiver
            .exchange(Command::ReadTemperature, &[])
            .await?;
        Ok(parse_temperature(&data)?)
    }

    /// Turns automatic baseline correction on or off (0x79).
    ///
    /// Note: Write-only command; the sensor sends no acknowledgment.
    pub async fn set_auto_calib(&mut self, state: CalibState) -> Result<()> {
        let param = if state.is_on() { CALIB_ON } else { CALIB_OFF };
        self.transceiver.send(Command::SetAutoCalib, &[param]).await
    }

    /// Reads the automatic baseline correction state (0x7D).
    pub async fn get_auto_calib(&mut self) -> Result<CalibState> {
        let data = self.transceiver.exchange(Command::GetAutoCalib, &[]).await?;
        Ok(parse_calib_state(&data)?)
    }

    /// Takes the current ambient air as the zero point (0x87).
    ///
    /// Note: Write-only command; the sensor sends no acknowledgment.
    pub async fn zero_calibration(&mut self) -> Result<()> {
        self.transceiver.send(Command::ZeroCalibration, &[]).await
    }

    /// Reads the firmware version (0xA0).
    pub async fn get_version(&mut self) -> Result<FirmwareVersion> {
        let data = self.transceiver.exchange(Command::GetVersion, &[]).await?;
        Ok(parse_version(&data)?)
    }
}
