//! The cse7766 module contains the components responsible for the core
//! CSE7766 protocol implementation: frame assembly and validation, field
//! decoding, accumulation/averaging, and serial communication.

pub mod accumulator;
pub mod assembler;
pub mod decode;
pub mod frame;
pub mod meter;
pub mod serial;

pub use accumulator::{Accumulator, EnergyTotalizer};
pub use assembler::{AssemblerEvent, BufferSource, ByteSource, FrameAssembler};
pub use decode::{decode, DecodeResult, DiscardReason};
pub use frame::{
    checksum, is_valid, parse_fields, verify_frame, AdjustmentFlags, FrameFields, FrameStage,
    HeaderFlags, RawFrame,
};
pub use meter::{Cse7766Meter, FrameOutcome, MeterReadings};
pub use serial::{Cse7766DeviceHandle, SerialConfig};
