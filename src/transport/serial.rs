//! Serial/UART channel implementation.
//!
//! This module drives the sensor through the OS serial driver at 9600 baud,
//! 8 data bits, no parity, one stop bit, raw mode.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream,
    StopBits,
};

use crate::error::{Error, Result};
use crate::transport::{Channel, ChannelFuture};

/// Default serial device (Raspberry Pi primary UART).
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Baud rate fixed by the sensor.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default bounded wait for a single read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Configuration for the serial channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/serial0" or "/dev/ttyUSB0").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// How long one read waits before reporting zero bytes.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the per-read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

/// Serial channel to the sensor.
///
/// The port is closed when the channel is closed or dropped.
pub struct SerialChannel {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialChannel {
    /// Creates a new serial channel with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new serial channel for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the channel configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn stream_mut(&mut self) -> Result<&mut SerialStream> {
        self.stream.as_mut().ok_or(Error::NotOpen)
    }
}

impl Channel for SerialChannel {
    fn open(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!(
                "opening serial port {} at {} baud",
                self.config.port,
                self.config.baud_rate
            );

            let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(self.config.read_timeout)
                .open_native_async()
                .map_err(Error::ChannelOpen)?;

            // Discard anything the sensor sent before we were listening
            stream.clear(ClearBuffer::All).map_err(Error::ChannelOpen)?;

            self.stream = Some(stream);
            Ok(())
        })
    }

    fn close(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("closed serial port {}", self.config.port);
            }
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, data: &'a [u8]) -> ChannelFuture<'a, usize> {
        Box::pin(async move {
            let stream = self.stream_mut()?;
            let n = stream.write(data).await?;
            Ok(n)
        })
    }

    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> ChannelFuture<'a, usize> {
        Box::pin(async move {
            let timeout = self.config.read_timeout;
            let stream = self.stream_mut()?;
            match tokio::time::timeout(timeout, stream.read(buf)).await {
                Ok(Ok(n)) => Ok(n),
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
                Ok(Err(e)) => Err(Error::Io(e)),
                Err(_) => Ok(0),
            }
        })
    }

    fn flush_input(&mut self) -> Result<()> {
        self.stream_mut()?
            .clear(ClearBuffer::Input)
            .map_err(|e| Error::Io(e.into()))
    }

    fn drain_output(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            // Returns once the bytes are queued with the driver.
            self.stream_mut()?.flush().await?;
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}
