//! Scripted channel for exercising the protocol without hardware.
//!
//! Each written frame consumes the next reply script. A script is the list
//! of results successive reads return; an empty chunk is a read timeout.
//! Once a script is exhausted every read times out.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::{Command, DATA_LEN, FRAME_LEN, FRAME_START, checksum};
use crate::transport::{Channel, ChannelFuture};

/// Builds a valid response frame for `command` carrying `data`.
pub(crate) fn response_frame(command: Command, data: [u8; DATA_LEN]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = FRAME_START;
    frame[1] = command.opcode();
    frame[2..2 + DATA_LEN].copy_from_slice(&data);
    frame[FRAME_LEN - 1] = checksum(&frame);
    frame
}

#[derive(Debug, Default)]
pub(crate) struct MockChannel {
    open: bool,
    fail_open: bool,
    write_limit: Option<usize>,
    read_delay: Option<Duration>,
    replies: VecDeque<Vec<Vec<u8>>>,
    pending: VecDeque<Vec<u8>>,
    stale: Vec<u8>,
    pub(crate) written: Vec<Vec<u8>>,
    pub(crate) reads: usize,
    pub(crate) flushes: usize,
    pub(crate) drains: usize,
    pub(crate) closes: usize,
}

impl MockChannel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers the next write with `frame` in a single read.
    pub(crate) fn reply(self, frame: [u8; FRAME_LEN]) -> Self {
        self.reply_chunks(vec![frame.to_vec()])
    }

    /// Answers the next write with `frame` split into `size`-byte reads.
    pub(crate) fn reply_fragmented(self, frame: [u8; FRAME_LEN], size: usize) -> Self {
        self.reply_chunks(frame.chunks(size).map(<[u8]>::to_vec).collect())
    }

    /// Answers the next write with an explicit sequence of read results.
    pub(crate) fn reply_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.replies.push_back(chunks);
        self
    }

    /// Leaves the next write unanswered.
    pub(crate) fn silent(self) -> Self {
        self.reply_chunks(Vec::new())
    }

    /// Pre-loads input left over from an earlier exchange.
    pub(crate) fn stale(mut self, bytes: &[u8]) -> Self {
        self.stale.extend_from_slice(bytes);
        self
    }

    /// Accepts at most `limit` bytes per write.
    pub(crate) fn write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Makes every read that times out take `delay`, like a real read timeout.
    pub(crate) fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Makes `open` fail as if the device were missing.
    pub(crate) fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl Channel for MockChannel {
    fn open(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.fail_open {
                return Err(Error::ChannelOpen(tokio_serial::Error::new(
                    tokio_serial::ErrorKind::NoDevice,
                    "mock device unavailable",
                )));
            }
            self.open = true;
            Ok(())
        })
    }

    fn close(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            self.open = false;
            self.closes += 1;
            Ok(())
        })
    }

    fn write<'a>(&'a mut self, data: &'a [u8]) -> ChannelFuture<'a, usize> {
        Box::pin(async move {
            self.written.push(data.to_vec());
            if let Some(script) = self.replies.pop_front() {
                self.pending = script.into();
            }
            Ok(self.write_limit.map_or(data.len(), |l| l.min(data.len())))
        })
    }

    fn read<'a>(&'a mut self, buf: &'a mut [u8]) -> ChannelFuture<'a, usize> {
        Box::pin(async move {
            self.reads += 1;

            let mut chunk = if self.stale.is_empty() {
                match self.pending.pop_front() {
                    Some(chunk) if !chunk.is_empty() => chunk,
                    _ => {
                        if let Some(delay) = self.read_delay {
                            tokio::time::sleep(delay).await;
                        }
                        return Ok(0);
                    }
                }
            } else {
                std::mem::take(&mut self.stale)
            };

            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.pending.push_front(chunk.split_off(n));
            }
            Ok(n)
        })
    }

    fn flush_input(&mut self) -> Result<()> {
        self.flushes += 1;
        self.stale.clear();
        self.pending.clear();
        Ok(())
    }

    fn drain_output(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            self.drains += 1;
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
