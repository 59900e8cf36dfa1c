//! # CSE7766 Frame Decoder
//!
//! This module provides functionality to validate and decode the fixed
//! 24-byte telemetry frames emitted by the CSE7766 power-metering chip.
//! Field extraction leverages the `nom` crate for reliable parsing of the
//! binary payload.
//!
//! ## Features
//! - Per-position incremental validation of an in-progress frame: sync
//!   header bytes up front, additive checksum on the final byte.
//! - Extraction of the six 24-bit calibration coefficient/cycle fields, the
//!   adjustment byte and the 16-bit CF pulse counter.
//! - Named bitflag types for the header status bits and the adjustment
//!   presence bits, so the datasheet decode rules stay self-documenting.
//!
//! ## Usage
//!
//! Validating a buffer position and extracting fields:
//! ```ignore
//! if is_valid(&frame, OFFSET_CHECKSUM) {
//!     let fields = parse_fields(&frame)?;
//!     // fields.voltage_coefficient, fields.cf_pulses, ...
//! }
//! ```
//!
//! ## Error Handling
//! `parse_fields` reports failures through `Cse7766Error::FrameParseError`;
//! in practice it cannot fail on a frame of the correct length, but the
//! error path keeps the nom plumbing honest.

use crate::constants::{
    CHECKSUM_FIRST, CHECKSUM_LAST, FRAME_LEN, OFFSET_CHECKSUM, OFFSET_VOLTAGE_COEFFICIENT,
    SYNC_HEADER1, SYNC_HEADER1_STATUS_NIBBLE, SYNC_HEADER1_UNCALIBRATED, SYNC_HEADER2,
};
use crate::Cse7766Error;
use bitflags::bitflags;
use nom::number::complete::{be_u16, be_u24, be_u8};
use nom::sequence::tuple;
use nom::IResult;

/// One raw 24-byte telemetry frame as received from the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; FRAME_LEN],
}

impl Default for RawFrame {
    fn default() -> Self {
        RawFrame::new()
    }
}

impl RawFrame {
    /// Creates an empty (all-zero) frame buffer.
    pub fn new() -> Self {
        RawFrame {
            bytes: [0u8; FRAME_LEN],
        }
    }

    /// Returns the byte at `position`.
    pub fn byte(&self, position: usize) -> u8 {
        self.bytes[position]
    }

    /// Stores `byte` at `position`.
    pub fn set_byte(&mut self, position: usize, byte: u8) {
        self.bytes[position] = byte;
    }

    /// Header byte 1 (sync marker and/or status flags).
    pub fn header1(&self) -> u8 {
        self.bytes[0]
    }

    /// Header byte 2 (fixed sync value).
    pub fn header2(&self) -> u8 {
        self.bytes[1]
    }

    /// Returns the frame contents as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<[u8; FRAME_LEN]> for RawFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        RawFrame { bytes }
    }
}

bitflags! {
    /// Status bits carried in the low nibble of header byte 1 when its
    /// upper nibble is 0xF.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u8 {
        /// Coefficient storage area is abnormal.
        const STORAGE_ABNORMAL = 1 << 0;
        /// Power cycle exceeds range (active power is defined to be 0).
        const POWER_CYCLE_EXCEEDS_RANGE = 1 << 1;
        /// Current cycle exceeds range (measurements unusable).
        const CURRENT_CYCLE_EXCEEDS_RANGE = 1 << 2;
        /// Voltage cycle exceeds range (measurements unusable).
        const VOLTAGE_CYCLE_EXCEEDS_RANGE = 1 << 3;
    }
}

impl HeaderFlags {
    /// Conditions that make the whole frame unusable.
    pub fn is_fatal(&self) -> bool {
        self.intersects(
            HeaderFlags::STORAGE_ABNORMAL
                | HeaderFlags::CURRENT_CYCLE_EXCEEDS_RANGE
                | HeaderFlags::VOLTAGE_CYCLE_EXCEEDS_RANGE,
        )
    }
}

bitflags! {
    /// Presence bits of the adjustment byte: which quantities this frame
    /// carries valid data for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AdjustmentFlags: u8 {
        const POWER = 1 << 4;
        const CURRENT = 1 << 5;
        const VOLTAGE = 1 << 6;
    }
}

/// Validation stage of an in-progress frame, derived from the cursor
/// position. Makes the implicit index-comparison state machine explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    AwaitingHeader1,
    AwaitingHeader2,
    AccumulatingBody,
    Complete,
}

impl FrameStage {
    /// Returns the stage the assembler is in when the byte at `position`
    /// has just been stored.
    pub fn at(position: usize) -> FrameStage {
        match position {
            0 => FrameStage::AwaitingHeader1,
            1 => FrameStage::AwaitingHeader2,
            p if p == OFFSET_CHECKSUM => FrameStage::Complete,
            _ => FrameStage::AccumulatingBody,
        }
    }
}

/// Calculates the frame checksum: the low 8 bits of the sum of bytes
/// 2 through 22 inclusive.
pub fn checksum(frame: &RawFrame) -> u8 {
    frame.bytes[CHECKSUM_FIRST..=CHECKSUM_LAST]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Decides whether the buffer is still structurally acceptable given the
/// bytes seen up to and including `position`.
///
/// Header bytes are checked incrementally so the assembler can resynchronize
/// within 1-2 bytes of a stream glitch; body bytes are only validated
/// retroactively by the checksum once the frame is complete.
pub fn is_valid(frame: &RawFrame, position: usize) -> bool {
    let byte = frame.byte(position);
    match FrameStage::at(position) {
        FrameStage::AwaitingHeader1 => {
            byte == SYNC_HEADER1
                || (byte & 0xF0) == SYNC_HEADER1_STATUS_NIBBLE
                || byte == SYNC_HEADER1_UNCALIBRATED
        }
        FrameStage::AwaitingHeader2 => byte == SYNC_HEADER2,
        FrameStage::AccumulatingBody => true,
        FrameStage::Complete => checksum(frame) == byte,
    }
}

/// Verifies the integrity of a complete frame: sync headers, then checksum.
pub fn verify_frame(frame: &RawFrame) -> Result<(), Cse7766Error> {
    for position in [0, 1] {
        if !is_valid(frame, position) {
            return Err(Cse7766Error::InvalidHeader {
                position,
                byte: frame.byte(position),
            });
        }
    }
    let calculated = checksum(frame);
    let expected = frame.byte(OFFSET_CHECKSUM);
    if calculated != expected {
        return Err(Cse7766Error::InvalidChecksum {
            expected,
            calculated,
        });
    }
    Ok(())
}

/// The raw measurement fields of one frame, before any unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFields {
    pub voltage_coefficient: u32,
    pub voltage_cycle: u32,
    pub current_coefficient: u32,
    pub current_cycle: u32,
    pub power_coefficient: u32,
    pub power_cycle: u32,
    pub adjustment: AdjustmentFlags,
    pub cf_pulses: u16,
}

/// Uses the `nom` crate to extract the measurement fields from the frame
/// body (bytes 2 through 22).
fn parse_body(input: &[u8]) -> IResult<&[u8], FrameFields> {
    let (input, (vc, vq, ic, iq, pc, pq, adjustment, cf_pulses)) = tuple((
        be_u24, be_u24, be_u24, be_u24, be_u24, be_u24, be_u8, be_u16,
    ))(input)?;
    Ok((
        input,
        FrameFields {
            voltage_coefficient: vc,
            voltage_cycle: vq,
            current_coefficient: ic,
            current_cycle: iq,
            power_coefficient: pc,
            power_cycle: pq,
            adjustment: AdjustmentFlags::from_bits_truncate(adjustment),
            cf_pulses,
        },
    ))
}

/// Extracts the measurement fields from a validated frame.
pub fn parse_fields(frame: &RawFrame) -> Result<FrameFields, Cse7766Error> {
    let body = &frame.bytes[OFFSET_VOLTAGE_COEFFICIENT..=CHECKSUM_LAST];
    let (_, fields) =
        parse_body(body).map_err(|e| Cse7766Error::FrameParseError(format!("{e:?}")))?;
    Ok(fields)
}
