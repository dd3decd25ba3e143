//! Request/response exchange over a [`Channel`].
//!
//! One exchange flushes stale input, writes a full request frame in a single
//! call, then accumulates the nine-byte response across as many reads as the
//! retry ceiling allows. Serial drivers hand back whatever has arrived, so
//! fragmented and empty reads are the normal case.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::{Command, FRAME_LEN, decode, encode};
use crate::transport::Channel;

/// Default number of reads allowed to complete one response frame.
pub const DEFAULT_RETRY_CEILING: usize = 10;

/// Drives single request/response exchanges over an owned channel.
pub struct Transceiver<C> {
    channel: C,
    retry_ceiling: usize,
    verbose: bool,
}

impl<C: Channel> Transceiver<C> {
    /// Creates a transceiver with the default retry ceiling.
    #[must_use]
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            verbose: false,
        }
    }

    /// Sets how many reads may be spent on one response frame (at least 1).
    pub fn set_retry_ceiling(&mut self, ceiling: usize) {
        self.retry_ceiling = ceiling.max(1);
    }

    /// Returns the retry ceiling.
    #[must_use]
    pub const fn retry_ceiling(&self) -> usize {
        self.retry_ceiling
    }

    /// Logs frames at `debug` instead of `trace` when set.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Returns the underlying channel.
    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Returns the underlying channel mutably.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    fn log_frame(&self, direction: &'static str, frame: &[u8]) {
        if self.verbose {
            tracing::debug!(direction, frame = %hex::encode(frame), "frame");
        } else {
            tracing::trace!(direction, frame = %hex::encode(frame), "frame");
        }
    }

    /// Writes a request frame without waiting for a response.
    pub async fn send(&mut self, command: Command, payload: &[u8]) -> Result<()> {
        self.channel.flush_input()?;

        let frame = encode(command, payload);
        self.log_frame("tx", frame.as_ref());

        let written = self.channel.write(frame.as_ref()).await?;
        if written < FRAME_LEN {
            return Err(Error::Write {
                written,
                expected: FRAME_LEN,
            });
        }
        self.channel.drain_output().await
    }

    /// Sends a request and returns the response data, truncated to the
    /// command's response width.
    pub async fn exchange(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        self.send(command, payload).await?;

        let raw = self.read_frame().await?;
        self.log_frame("rx", &raw);

        let response = decode(&raw)?;
        if response.command != command.opcode() {
            return Err(Error::UnexpectedResponse {
                expected: command.opcode(),
                actual: response.command,
            });
        }

        Ok(Bytes::copy_from_slice(
            response.payload(command.response_width()),
        ))
    }

    async fn read_frame(&mut self) -> Result<[u8; FRAME_LEN]> {
        let mut buf = [0u8; FRAME_LEN];
        let mut received = 0;

        for attempt in 1..=self.retry_ceiling {
            let n = self.channel.read(&mut buf[received..]).await?;
            received = (received + n).min(FRAME_LEN);
            tracing::trace!("read attempt {attempt}: {n} bytes, {received}/{FRAME_LEN}");

            if received == FRAME_LEN {
                return Ok(buf);
            }
        }

        tracing::debug!(
            "no complete frame after {} reads ({received} bytes)",
            self.retry_ceiling
        );
        Err(Error::ReadTimeout {
            received,
            attempts: self.retry_ceiling,
        })
    }
}
