//! Error types for the mhz19c library.

use thiserror::Error;

/// The main error type for sensor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The serial device could not be opened or rejected its configuration.
    #[error("failed to open channel: {0}")]
    ChannelOpen(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A command was issued on a handle that is not open.
    #[error("device is not open")]
    NotOpen,

    /// `open` was called on a handle that is already open.
    #[error("device is already open")]
    AlreadyOpen,

    /// The handle has been closed and cannot be used again.
    #[error("device is already closed")]
    AlreadyClosed,

    /// The channel accepted fewer bytes than a full frame.
    #[error("short write: {written} of {expected} bytes accepted")]
    Write { written: usize, expected: usize },

    /// Fewer than a full frame arrived within the retry ceiling.
    #[error("read timed out: {received} of 9 bytes after {attempts} attempts")]
    ReadTimeout { received: usize, attempts: usize },

    /// The response echoed a different command than the one sent.
    #[error("unexpected response: expected command 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedResponse { expected: u8, actual: u8 },
}

/// Frame-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Received checksum does not match the one computed over the frame.
    #[error("checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Response payload shorter than the command interprets.
    #[error("incomplete payload: expected {expected} bytes, got {got}")]
    Incomplete { expected: usize, got: usize },
}

/// Result type alias for sensor operations.
pub type Result<T> = std::result::Result<T, Error>;
