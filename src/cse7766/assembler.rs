//! # Frame Assembly and Resynchronization
//!
//! The CSE7766 streams frames back to back with no out-of-band delimiter,
//! so the assembler has to find frame boundaries inside an unbounded byte
//! stream. It consumes one byte at a time from the byte source, validates
//! the buffer incrementally (see [`crate::cse7766::frame::is_valid`]), and
//! restarts at position 0 whenever a byte cannot belong to a well-formed
//! frame or the line goes quiet for too long.

use crate::constants::{FRAME_LEN, RESYNC_TIMEOUT_MS};
use crate::cse7766::frame::{is_valid, RawFrame};
use log::{debug, warn};
use std::collections::VecDeque;

/// Non-blocking byte supplier, typically backed by a UART receive buffer.
pub trait ByteSource {
    /// Number of bytes that can be read without blocking.
    fn available(&self) -> usize;

    /// Reads one byte; must only be called while `available() > 0`.
    fn read_byte(&mut self) -> u8;
}

/// Simple queue-backed [`ByteSource`], used by the serial bridge and by
/// tests to feed captured byte streams.
#[derive(Debug, Default)]
pub struct BufferSource {
    queue: VecDeque<u8>,
}

impl BufferSource {
    pub fn new() -> Self {
        BufferSource::default()
    }

    /// Appends bytes to be consumed by the assembler.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.queue.extend(bytes);
    }
}

impl ByteSource for BufferSource {
    fn available(&self) -> usize {
        self.queue.len()
    }

    fn read_byte(&mut self) -> u8 {
        self.queue.pop_front().unwrap_or(0)
    }
}

/// What happened while the assembler consumed the available bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerEvent {
    /// A byte failed validation; the partial frame at `position` was
    /// dropped and frame search restarted.
    Resynced { position: usize },
    /// A full frame passed validation at every position.
    FrameComplete(RawFrame),
}

/// Incremental frame assembler: 24-byte holding buffer, a wrapping write
/// cursor, and the inter-byte timeout that bounds how long stale partial
/// state can survive.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: RawFrame,
    cursor: usize,
    last_rx_ms: u32,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        FrameAssembler::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        FrameAssembler {
            buffer: RawFrame::new(),
            cursor: 0,
            last_rx_ms: 0,
        }
    }

    /// Current write position, 0..24.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drains every currently available byte from `source`, appending
    /// events for each resync and each completed frame.
    ///
    /// `now_ms` is a monotonic millisecond clock supplied by the caller;
    /// comparisons use wrapping u32 arithmetic. The timestamp of the last
    /// reception is updated once per invocation, not per byte.
    pub fn poll(
        &mut self,
        source: &mut dyn ByteSource,
        now_ms: u32,
        events: &mut Vec<AssemblerEvent>,
    ) {
        if now_ms.wrapping_sub(self.last_rx_ms) >= RESYNC_TIMEOUT_MS {
            // Last transmission too long ago: abandon any partial frame.
            // A timeout is not a validation failure, so no event is raised.
            if self.cursor != 0 {
                debug!(
                    "inter-byte timeout, dropping partial frame at position {}",
                    self.cursor
                );
            }
            self.cursor = 0;
        }

        if source.available() == 0 {
            return;
        }
        self.last_rx_ms = now_ms;

        while source.available() != 0 {
            let byte = source.read_byte();
            self.buffer.set_byte(self.cursor, byte);

            if !is_valid(&self.buffer, self.cursor) {
                warn!(
                    "invalid byte {byte:#04X} at position {}, resynchronizing",
                    self.cursor
                );
                events.push(AssemblerEvent::Resynced {
                    position: self.cursor,
                });
                self.cursor = 0;
                continue;
            }

            if self.cursor == FRAME_LEN - 1 {
                events.push(AssemblerEvent::FrameComplete(self.buffer));
            }

            self.cursor = (self.cursor + 1) % FRAME_LEN;
        }
    }
}
