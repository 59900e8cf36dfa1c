//! # CSE7766 Error Handling
//!
//! This module defines the Cse7766Error enum, which represents the different
//! error types that can occur in the cse7766-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the CSE7766 crate.
#[derive(Debug, Error)]
pub enum Cse7766Error {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Indicates an error when parsing the fields of a CSE7766 frame.
    #[error("Error parsing CSE7766 frame: {0}")]
    FrameParseError(String),

    /// Indicates a checksum mismatch.
    #[error("Invalid checksum: expected {expected:#04X}, calculated {calculated:#04X}")]
    InvalidChecksum { expected: u8, calculated: u8 },

    /// Indicates an invalid sync header byte.
    #[error("Invalid header byte at position {position}: {byte:#04X}")]
    InvalidHeader { position: usize, byte: u8 },
}
