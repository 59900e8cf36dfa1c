//! CSE7766 Protocol Constants
//!
//! This module defines constants used in the CSE7766 serial protocol
//! implementation, based on the HLW/CSE7766 datasheet.

/// Total length of one telemetry frame in bytes.
pub const FRAME_LEN: usize = 24;

/// Primary sync value for header byte 1.
pub const SYNC_HEADER1: u8 = 0x55;

/// Legacy sync value for header byte 1; doubles as the "chip not
/// factory-calibrated" sentinel during decoding.
pub const SYNC_HEADER1_UNCALIBRATED: u8 = 0xAA;

/// Upper-nibble value marking a status-flagged header byte 1.
pub const SYNC_HEADER1_STATUS_NIBBLE: u8 = 0xF0;

/// Fixed sync value for header byte 2.
pub const SYNC_HEADER2: u8 = 0x5A;

// ----------------------------------------------------------------------------
// Field offsets within a frame
// ----------------------------------------------------------------------------

/// Offset of the voltage coefficient (24-bit big-endian).
pub const OFFSET_VOLTAGE_COEFFICIENT: usize = 2;

/// Offset of the voltage cycle (24-bit big-endian).
pub const OFFSET_VOLTAGE_CYCLE: usize = 5;

/// Offset of the current coefficient (24-bit big-endian).
pub const OFFSET_CURRENT_COEFFICIENT: usize = 8;

/// Offset of the current cycle (24-bit big-endian).
pub const OFFSET_CURRENT_CYCLE: usize = 11;

/// Offset of the power coefficient (24-bit big-endian).
pub const OFFSET_POWER_COEFFICIENT: usize = 14;

/// Offset of the power cycle (24-bit big-endian).
pub const OFFSET_POWER_CYCLE: usize = 17;

/// Offset of the adjustment/presence byte.
pub const OFFSET_ADJUSTMENT: usize = 20;

/// Offset of the 16-bit big-endian CF pulse counter.
pub const OFFSET_CF_PULSES: usize = 21;

/// Offset of the checksum byte.
pub const OFFSET_CHECKSUM: usize = 23;

/// First byte covered by the checksum (inclusive).
pub const CHECKSUM_FIRST: usize = 2;

/// Last byte covered by the checksum (inclusive).
pub const CHECKSUM_LAST: usize = 22;

// ----------------------------------------------------------------------------
// Timing
// ----------------------------------------------------------------------------

/// Milliseconds of serial silence after which a partial frame is abandoned
/// and the cursor resets to position 0.
pub const RESYNC_TIMEOUT_MS: u32 = 500;

/// Fixed line rate of the chip's UART.
pub const BAUD_RATE: u32 = 4800;

/// CF pulse counter modulus (the counter wraps past 16 bits).
pub const CF_PULSE_MODULUS: u32 = 0x10000;
