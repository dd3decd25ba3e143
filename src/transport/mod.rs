//! Transport layer for sensor communication.
//!
//! This module provides the byte-channel abstraction the protocol runs on.
//! Only UART via the OS serial driver is implemented.

#[cfg(test)]
pub(crate) mod mock;
pub mod serial;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Boxed future returned by [`Channel`] methods.
pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Duplex byte channel to the sensor.
///
/// Reads wait a bounded time and report a timeout as zero bytes read,
/// never as an error.
pub trait Channel: Send {
    /// Opens and configures the underlying device.
    fn open(&mut self) -> ChannelFuture<'_, ()>;

    /// Releases the underlying device.
    fn close(&mut self) -> ChannelFuture<'_, ()>;

    /// Writes bytes, returning how many were accepted.
    fn write<'a>(&'a mut self, data: &'a [u8]) -> ChannelFuture<'a, usize>;

    /// Reads into `buf`, returning how many bytes arrived (0 on timeout).
    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> ChannelFuture<'a, usize>;

    /// Discards any buffered input.
    fn flush_input(&mut self) -> Result<()>;

    /// Flushes any output buffered above the driver.
    ///
    /// This does not wait for the driver's transmit queue to empty.
    fn drain_output(&mut self) -> ChannelFuture<'_, ()>;

    /// Returns true if the device is open.
    fn is_open(&self) -> bool;
}

pub use serial::SerialChannel;
