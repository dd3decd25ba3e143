//! # mhz19c
//!
//! An async driver for the MH-Z19C infrared CO2 sensor.
//!
//! The sensor speaks a fixed nine-byte request/response protocol over UART
//! (9600 baud, 8-N-1). This library builds and validates those frames,
//! runs each exchange with a bounded read-retry loop, and exposes the
//! sensor's commands as typed methods.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mhz19c::Mhz19c;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mhz19c::Error> {
//!     let mut sensor = Mhz19c::serial("/dev/serial0");
//!     sensor.open().await?;
//!
//!     let reading = sensor.read_co2().await?;
//!     println!("CO2: {} ppm", reading.co2_ppm);
//!
//!     sensor.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Frame codec, command opcodes, payload parsers
//! - [`transport`] - The [`Channel`] byte-stream abstraction and its serial implementation
//! - [`transceiver`] - Write-then-accumulate exchange with a retry ceiling
//! - [`commands`] - Typed sensor commands
//! - [`client`] - The [`Mhz19c`] device handle and its open/close lifecycle
//! - [`types`] - Values returned by commands

pub mod client;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod transceiver;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{DeviceConfig, Mhz19c};
pub use commands::CommandHandler;
pub use error::{Error, FrameError, Result};
pub use protocol::{Command, Frame, Response};
pub use transceiver::{DEFAULT_RETRY_CEILING, Transceiver};
pub use transport::serial::SerialConfig;
pub use transport::{Channel, SerialChannel};
pub use types::{CalibState, FirmwareVersion, SensorReading};
