//! Frame encoding and decoding for the MH-Z19C protocol.
//!
//! Every exchange uses fixed nine-byte frames. Requests and responses share
//! the start byte and trailing checksum but lay out the middle differently:
//! ```text
//! request:  ┌──────┬──────┬─────┬──────────────┬──────────┐
//!           │ 0xFF │ 0x01 │ cmd │ payload (5)  │ checksum │
//!           └──────┴──────┴─────┴──────────────┴──────────┘
//! response: ┌──────┬─────┬─────────────────────┬──────────┐
//!           │ 0xFF │ cmd │      data (6)       │ checksum │
//!           └──────┴─────┴─────────────────────┴──────────┘
//! ```
//! The checksum is `0xFF - (sum of bytes 1..=7) + 1`, modulo 256.

use std::fmt;

use bytes::BufMut;

use crate::error::FrameError;
use crate::protocol::command::Command;

/// Length of every frame on the wire.
pub const FRAME_LEN: usize = 9;

/// Start byte of every frame.
pub const FRAME_START: u8 = 0xFF;

/// Reserved (sensor address) byte of a request.
pub const RESERVED: u8 = 0x01;

/// Size of the parameter slot in a request.
pub const PAYLOAD_LEN: usize = 5;

/// Size of the data region in a response.
pub const DATA_LEN: usize = 6;

/// Computes the checksum over bytes 1..=7 of a frame.
///
/// Used for both directions: when encoding, byte 8 is ignored; when
/// decoding, the result is compared against byte 8.
#[must_use]
pub fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    let sum = frame[1..FRAME_LEN - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    (0xFF - sum).wrapping_add(1)
}

fn verify(frame: &[u8; FRAME_LEN]) -> Result<(), FrameError> {
    let expected = checksum(frame);
    let actual = frame[FRAME_LEN - 1];
    if expected == actual {
        Ok(())
    } else {
        Err(FrameError::ChecksumMismatch { expected, actual })
    }
}

/// A complete nine-byte frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Wraps raw bytes without validating them.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Returns the trailing checksum byte.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.0[FRAME_LEN - 1]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", hex::encode(self.0))
    }
}

/// Decoded response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Command byte echoed by the sensor.
    pub command: u8,
    /// Data region (bytes 2..=7).
    pub data: [u8; DATA_LEN],
}

impl Response {
    /// Returns the first `width` data bytes.
    #[must_use]
    pub fn payload(&self, width: usize) -> &[u8] {
        &self.data[..width.min(DATA_LEN)]
    }
}

/// Encodes a request frame.
///
/// The payload is right-padded with zeros to fill the five-byte slot.
///
/// # Panics
///
/// Panics if the payload exceeds `PAYLOAD_LEN`.
#[must_use]
pub fn encode(command: Command, payload: &[u8]) -> Frame {
    assert!(
        payload.len() <= PAYLOAD_LEN,
        "payload exceeds frame payload slot"
    );

    let mut raw = [0u8; FRAME_LEN];
    {
        let mut buf = &mut raw[..];
        buf.put_u8(FRAME_START);
        buf.put_u8(RESERVED);
        buf.put_u8(command.opcode());
        buf.put_slice(payload);
    }
    raw[FRAME_LEN - 1] = checksum(&raw);
    Frame(raw)
}

/// Decodes a response frame received from the sensor.
///
/// Only the checksum is validated; the start byte is not checked.
///
/// # Errors
///
/// Returns `FrameError::ChecksumMismatch` if the frame is corrupted.
pub fn decode(bytes: &[u8; FRAME_LEN]) -> Result<Response, FrameError> {
    verify(bytes)?;

    let mut data = [0u8; DATA_LEN];
    data.copy_from_slice(&bytes[2..2 + DATA_LEN]);
    Ok(Response {
        command: bytes[1],
        data,
    })
}

/// Decodes a request frame, as the sensor would.
///
/// Returns the opcode and the five-byte payload slot.
///
/// # Errors
///
/// Returns `FrameError::ChecksumMismatch` if the frame is corrupted.
pub fn decode_request(bytes: &[u8; FRAME_LEN]) -> Result<(u8, [u8; PAYLOAD_LEN]), FrameError> {
    verify(bytes)?;

    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&bytes[3..3 + PAYLOAD_LEN]);
    Ok((bytes[2], payload))
}
