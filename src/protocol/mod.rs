//! Protocol definitions for MH-Z19C communication.
//!
//! This module contains the low-level protocol types including:
//! - Frame encoding/decoding and the checksum
//! - Command opcodes and response widths
//! - Response payload parsing

pub mod command;
pub mod frame;
pub mod parser;

pub use command::{CALIB_OFF, CALIB_ON, Command};
pub use frame::{
    DATA_LEN, FRAME_LEN, FRAME_START, Frame, PAYLOAD_LEN, RESERVED, Response, checksum, decode,
    decode_request, encode,
};
pub use parser::{parse_calib_state, parse_co2, parse_temperature, parse_version};
