//! Main [`Mhz19c`] device handle.
//!
//! The handle owns the channel for its whole life and walks a one-way state
//! machine: `Idle` → `Open` → `Closed`. Commands are only accepted while
//! open, and each one runs a single exchange to completion.

use crate::commands::CommandHandler;
use crate::error::{Error, FrameError, Result};
use crate::transceiver::{DEFAULT_RETRY_CEILING, Transceiver};
use crate::transport::serial::{DEFAULT_PORT, SerialConfig};
use crate::transport::{Channel, SerialChannel};
use crate::types::{CalibState, FirmwareVersion, SensorReading};

/// Configuration for a serial-attached sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Serial channel settings.
    pub serial: SerialConfig,
    /// Reads allowed per response frame.
    pub retry_ceiling: usize,
    /// Log every frame at `debug`.
    pub verbose: bool,
}

impl DeviceConfig {
    /// Creates a configuration for the given port with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            serial: SerialConfig::new(port),
            retry_ceiling: DEFAULT_RETRY_CEILING,
            verbose: false,
        }
    }

    /// Replaces the serial settings.
    #[must_use]
    pub fn serial(mut self, serial: SerialConfig) -> Self {
        self.serial = serial;
        self
    }

    /// Sets the retry ceiling.
    #[must_use]
    pub const fn retry_ceiling(mut self, ceiling: usize) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    /// Sets frame logging verbosity.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Open,
    Closed,
}

/// Handle to one MH-Z19C sensor.
pub struct Mhz19c<C> {
    commands: CommandHandler<C>,
    state: State,
    version: Option<FirmwareVersion>,
}

impl Mhz19c<SerialChannel> {
    /// Creates a new handle for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/serial0")
    ///
    /// # Returns
    ///
    /// A new handle (not yet opened).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_config(DeviceConfig::new(port))
    }

    /// Creates a new handle from a full configuration.
    #[must_use]
    pub fn with_config(config: DeviceConfig) -> Self {
        let mut sensor = Self::new(SerialChannel::new(config.serial));
        sensor.set_retry_ceiling(config.retry_ceiling);
        sensor.set_verbose(config.verbose);
        sensor
    }
}

impl<C: Channel> Mhz19c<C> {
    /// Creates a new handle over the given channel.
    #[must_use]
    pub fn new(channel: C) -> Self {
        Self {
            commands: CommandHandler::new(Transceiver::new(channel)),
            state: State::Idle,
            version: None,
        }
    }

    /// Logs every frame at `debug` instead of `trace`.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.commands.transceiver_mut().set_verbose(verbose);
    }

    /// Sets how many reads may be spent on one response frame.
    pub fn set_retry_ceiling(&mut self, ceiling: usize) {
        self.commands.transceiver_mut().set_retry_ceiling(ceiling);
    }

    /// Opens the channel and queries the firmware version.
    ///
    /// The version query is best effort and its failure does not fail
    /// `open`. A garbled or mismatched reply is retried up to the retry
    /// ceiling; a sensor that stays silent is given up on after one exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be opened or the handle has
    /// already been opened.
    pub async fn open(&mut self) -> Result<()> {
        match self.state {
            State::Open => return Err(Error::AlreadyOpen),
            State::Closed => return Err(Error::AlreadyClosed),
            State::Idle => {}
        }

        self.commands.transceiver_mut().channel_mut().open().await?;
        self.state = State::Open;
        tracing::info!("sensor opened");

        self.version = self.probe_version().await;
        Ok(())
    }

    async fn probe_version(&mut self) -> Option<FirmwareVersion> {
        let attempts = self.commands.transceiver().retry_ceiling();
        for attempt in 1..=attempts {
            match self.commands.get_version().await {
                Ok(version) => {
                    tracing::info!("firmware version {version}");
                    return Some(version);
                }
                Err(
                    e @ (Error::Frame(FrameError::ChecksumMismatch { .. })
                    | Error::UnexpectedResponse { .. }),
                ) => {
                    tracing::debug!("version query {attempt}/{attempts} failed: {e}");
                }
                Err(e) => {
                    tracing::warn!("firmware version unavailable: {e}");
                    return None;
                }
            }
        }
        tracing::warn!("firmware version unavailable after {attempts} attempts");
        None
    }

    /// Closes the channel. The handle cannot be reopened.
    pub async fn close(&mut self) -> Result<()> {
        match self.state {
            State::Idle => Err(Error::NotOpen),
            State::Closed => Err(Error::AlreadyClosed),
            State::Open => {
                self.state = State::Closed;
                self.commands.transceiver_mut().channel_mut().close().await?;
                tracing::info!("sensor closed");
                Ok(())
            }
        }
    }

    /// Returns true if the handle is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Returns the firmware version cached at open or by [`Self::get_version`].
    #[must_use]
    pub const fn version(&self) -> Option<&FirmwareVersion> {
        self.version.as_ref()
    }

    /// Returns the underlying channel.
    #[must_use]
    pub const fn channel(&self) -> &C {
        self.commands.transceiver().channel()
    }

    fn commands(&mut self) -> Result<&mut CommandHandler<C>> {
        if self.state == State::Open {
            Ok(&mut self.commands)
        } else {
            Err(Error::NotOpen)
        }
    }

    // ==================== Sensor Commands ====================

    /// Reads CO2 concentration with the integer temperature.
    pub async fn read_co2(&mut self) -> Result<SensorReading> {
        self.commands()?.read_co2().await
    }

    /// Reads temperature with two decimals (undocumented command).
    pub async fn read_temperature(&mut self) -> Result<f32> {
        self.commands()?.read_temperature().await
    }

    /// Turns automatic baseline correction on or off.
    pub async fn set_auto_calib(&mut self, state: CalibState) -> Result<()> {
        self.commands()?.set_auto_calib(state).await
    }

    /// Reads the automatic baseline correction state.
    pub async fn get_auto_calib(&mut self) -> Result<CalibState> {
        self.commands()?.get_auto_calib().await
    }

    /// Requests a zero-point calibration.
    pub async fn zero_calibration(&mut self) -> Result<()> {
        self.commands()?.zero_calibration().await
    }

    /// Queries the firmware version and refreshes the cached copy.
    pub async fn get_version(&mut self) -> Result<FirmwareVersion> {
        let version = self.commands()?.get_version().await?;
        self.version = Some(version.clone());
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Command;
    use crate::transport::mock::{MockChannel, response_frame};
    use crate::types::MAX_PPM;
    use std::time::Duration;
    use tokio::time::Instant;

    fn version_frame() -> [u8; 9] {
        response_frame(Command::GetVersion, [b'0', b'5', b'0', b'2', 0, 0])
    }

    #[test]
    fn test_device_config_builder() {
        let config = DeviceConfig::new("/dev/ttyUSB0")
            .retry_ceiling(3)
            .verbose(true);
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.retry_ceiling, 3);
        assert!(config.verbose);
        assert_eq!(DeviceConfig::default().serial.port, DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_open_caches_version() {
        let mut sensor = Mhz19c::new(MockChannel::new().reply(version_frame()));

        sensor.open().await.unwrap();
        assert!(sensor.is_open());
        assert!(sensor.channel().is_open());
        assert_eq!(sensor.version().map(FirmwareVersion::as_str), Some("0502"));
    }

    #[tokio::test]
    async fn test_open_retries_garbled_version() {
        let mut corrupted = version_frame();
        corrupted[8] ^= 0x01;
        let mismatched = response_frame(Command::ReadCo2, [0x02, 0x58, 0x2D, 0, 0, 0]);
        let channel = MockChannel::new()
            .reply(corrupted)
            .reply(mismatched)
            .reply(version_frame());
        let mut sensor = Mhz19c::new(channel);

        sensor.open().await.unwrap();
        assert_eq!(sensor.channel().written.len(), 3);
        assert_eq!(sensor.version().map(FirmwareVersion::as_str), Some("0502"));
    }

    #[tokio::test]
    async fn test_open_gives_up_on_garbled_version() {
        let mut corrupted = version_frame();
        corrupted[8] ^= 0x01;
        let channel = MockChannel::new()
            .reply(corrupted)
            .reply(corrupted)
            .reply(version_frame());
        let mut sensor = Mhz19c::new(channel);
        sensor.set_retry_ceiling(2);

        sensor.open().await.unwrap();
        assert!(sensor.version().is_none());
        assert_eq!(sensor.channel().written.len(), 2);
    }

    #[tokio::test]
    async fn test_open_survives_missing_version() {
        let mut sensor = Mhz19c::new(MockChannel::new());

        sensor.open().await.unwrap();
        assert!(sensor.is_open());
        assert!(sensor.version().is_none());
        assert_eq!(sensor.channel().written.len(), 1);
        assert!(sensor.channel().reads <= DEFAULT_RETRY_CEILING);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_sensor_open_is_bounded() {
        let timeout = Duration::from_millis(500);
        let mut sensor = Mhz19c::new(MockChannel::new().read_delay(timeout));

        let started = Instant::now();
        sensor.open().await.unwrap();
        let ceiling = u32::try_from(DEFAULT_RETRY_CEILING).unwrap();
        assert!(started.elapsed() <= timeout * ceiling);
        assert_eq!(sensor.channel().reads, DEFAULT_RETRY_CEILING);
    }

    #[tokio::test]
    async fn test_open_failure() {
        let mut sensor = Mhz19c::new(MockChannel::new().failing_open());

        assert!(matches!(sensor.open().await, Err(Error::ChannelOpen(_))));
        assert!(!sensor.is_open());
        assert!(matches!(sensor.read_co2().await, Err(Error::NotOpen)));
    }

    #[tokio::test]
    async fn test_commands_before_open() {
        let mut sensor = Mhz19c::new(MockChannel::new());

        assert!(matches!(sensor.read_co2().await, Err(Error::NotOpen)));
        assert!(matches!(sensor.read_temperature().await, Err(Error::NotOpen)));
        assert!(matches!(
            sensor.set_auto_calib(CalibState::On).await,
            Err(Error::NotOpen)
        ));
        assert!(matches!(sensor.get_auto_calib().await, Err(Error::NotOpen)));
        assert!(matches!(sensor.zero_calibration().await, Err(Error::NotOpen)));
        assert!(matches!(sensor.get_version().await, Err(Error::NotOpen)));
        assert!(sensor.channel().written.is_empty());
    }

    #[tokio::test]
    async fn test_close_state_machine() {
        let mut sensor = Mhz19c::new(MockChannel::new().reply(version_frame()));

        assert!(matches!(sensor.close().await, Err(Error::NotOpen)));

        sensor.open().await.unwrap();
        assert!(matches!(sensor.open().await, Err(Error::AlreadyOpen)));

        sensor.close().await.unwrap();
        assert!(!sensor.is_open());
        assert_eq!(sensor.channel().closes, 1);

        assert!(matches!(sensor.close().await, Err(Error::AlreadyClosed)));
        assert!(matches!(sensor.open().await, Err(Error::AlreadyClosed)));
        assert!(matches!(sensor.read_co2().await, Err(Error::NotOpen)));
        assert_eq!(sensor.channel().closes, 1);
    }

    #[tokio::test]
    async fn test_get_version_refreshes_cache() {
        let newer = response_frame(Command::GetVersion, [b'0', b'6', b'0', b'0', 0, 0]);
        let mut sensor = Mhz19c::new(MockChannel::new().reply(version_frame()).reply(newer));

        sensor.open().await.unwrap();
        assert_eq!(sensor.get_version().await.unwrap().as_str(), "0600");
        assert_eq!(sensor.version().map(FirmwareVersion::as_str), Some("0600"));
    }

    #[tokio::test]
    async fn test_open_read_close() {
        let co2 = response_frame(Command::ReadCo2, [0x02, 0x58, 0x2D, 0x00, 0x00, 0x00]);
        let channel = MockChannel::new()
            .reply(version_frame())
            .reply_fragmented(co2, 2);
        let mut sensor = Mhz19c::new(channel);

        sensor.open().await.unwrap();
        let reading = sensor.read_co2().await.unwrap();
        assert_eq!(reading.co2_ppm, 600);
        assert!(reading.co2_ppm <= MAX_PPM);
        assert_eq!(reading.temperature, Some(5));
        sensor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_command_error_leaves_handle_open() {
        let channel = MockChannel::new().reply(version_frame()).silent();
        let mut sensor = Mhz19c::new(channel);
        sensor.set_retry_ceiling(4);

        sensor.open().await.unwrap();
        assert!(matches!(
            sensor.read_co2().await,
            Err(Error::ReadTimeout { attempts: 4, .. })
        ));
        assert!(sensor.is_open());
        sensor.close().await.unwrap();
    }
}
