//! # cse7766-rs - A Rust Crate for CSE7766 Power-Metering Telemetry
//!
//! The cse7766-rs crate decodes the telemetry stream of the CSE7766
//! single-phase power-metering chip, found in many smart plugs and power
//! strips. The chip continuously transmits fixed 24-byte binary frames over
//! a 4800-baud serial link; each frame carries calibration coefficients,
//! measurement cycle counts, a status/adjustment byte and a cumulative
//! energy pulse counter.
//!
//! ## Features
//!
//! - Synchronize to frame boundaries inside an unbounded byte stream, with
//!   automatic resynchronization after stream glitches or line silence
//! - Validate frames per position (sync headers, additive checksum)
//! - Convert raw coefficient/cycle fields into voltage, current and active
//!   power, applying the datasheet's error and range rules
//! - Totalize energy from the wrapping 16-bit CF pulse counter
//! - Average the high-rate frame stream into readings published on a slower
//!   periodic cadence
//! - Connect to the chip through a serial port
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```no_run
//! use cse7766_rs::{connect, Cse7766Meter};
//!
//! # async fn run() -> Result<(), cse7766_rs::Cse7766Error> {
//! let mut handle = connect("/dev/ttyUSB0").await?;
//! let mut meter = Cse7766Meter::new();
//! loop {
//!     handle.poll_into(&mut meter).await?;
//!     // on a slower cadence:
//!     let readings = meter.publish();
//!     if let Some(watts) = readings.power {
//!         println!("power: {watts:.1} W");
//!     }
//! }
//! # }
//! ```

pub mod constants;
pub mod cse7766;
pub mod error;
pub mod logging;

pub use crate::error::Cse7766Error;
pub use crate::logging::{init_logger, log_info};

// Core CSE7766 types
pub use cse7766::{
    Accumulator, AdjustmentFlags, AssemblerEvent, BufferSource, ByteSource, Cse7766DeviceHandle,
    Cse7766Meter, DecodeResult, DiscardReason, EnergyTotalizer, FrameAssembler, FrameFields,
    FrameOutcome, FrameStage, HeaderFlags, MeterReadings, RawFrame, SerialConfig,
};

/// Connect to a CSE7766 chip via serial port.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
///
/// # Returns
/// * `Ok(Cse7766DeviceHandle)` - Connected device handle
/// * `Err(Cse7766Error)` - Connection failed
pub async fn connect(port: &str) -> Result<Cse7766DeviceHandle, Cse7766Error> {
    Cse7766DeviceHandle::connect(port).await
}
