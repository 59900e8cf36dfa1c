//! # Field Decoding and Unit Conversion
//!
//! Turns one validated 24-byte frame into physical quantities, applying the
//! datasheet's error and range rules:
//!
//! - header byte 1 equal to 0xAA means the chip was never factory-calibrated
//!   and the frame carries no usable data;
//! - a status-flagged header (upper nibble 0xF) can mark the whole frame
//!   unusable (abnormal coefficient storage, voltage or current cycle out of
//!   range) or force active power to exactly zero (power cycle out of
//!   range, a recoverable condition);
//! - the adjustment byte says which of voltage/current/power this frame
//!   actually carries;
//! - a frame with voltage and current but no power reading empirically means
//!   zero power draw, so current is reported as 0 and a zero power sample is
//!   recorded for averaging.

use crate::constants::{SYNC_HEADER1_STATUS_NIBBLE, SYNC_HEADER1_UNCALIBRATED};
use crate::cse7766::accumulator::EnergyTotalizer;
use crate::cse7766::frame::{parse_fields, AdjustmentFlags, HeaderFlags, RawFrame};
use log::trace;
use thiserror::Error;

/// Why a structurally valid frame produced no quantities.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The chip has not been factory-calibrated.
    #[error("chip not calibrated")]
    NotCalibrated,

    /// The chip reports an abnormal external circuit or chip damage; the
    /// carried flags say which specific condition fired.
    #[error("abnormal circuit or chip damage: {0:?}")]
    AbnormalCondition(HeaderFlags),

    /// The frame body could not be parsed into a full field set.
    #[error("malformed frame body")]
    MalformedBody,
}

/// The physical quantities decoded from one frame.
///
/// Each quantity is present iff the corresponding adjustment bit was set.
/// `energy_increment` is computed whenever power is present, independent of
/// whether power itself was forced to zero.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DecodeResult {
    /// Volts.
    pub voltage: Option<f32>,
    /// Amperes.
    pub current: Option<f32>,
    /// Watts.
    pub power: Option<f32>,
    /// kWh added to the lifetime total by this frame.
    pub energy_increment: Option<f32>,
    /// Voltage and current present without power: the chip implies zero
    /// power draw, and the frame counts as a power sample of value 0.
    pub implied_zero_power: bool,
}

/// Decodes a frame that passed validation at every position.
///
/// Returns the decoded quantities, or the reason the frame carries nothing
/// usable. The energy totalizer is advanced for every power-bearing frame.
pub fn decode(
    frame: &RawFrame,
    totalizer: &mut EnergyTotalizer,
) -> Result<DecodeResult, DiscardReason> {
    let header1 = frame.header1();

    if header1 == SYNC_HEADER1_UNCALIBRATED {
        return Err(DiscardReason::NotCalibrated);
    }

    let mut power_cycle_exceeds_range = false;
    if (header1 & 0xF0) == SYNC_HEADER1_STATUS_NIBBLE {
        let flags = HeaderFlags::from_bits_truncate(header1);
        if flags.is_fatal() {
            // Datasheet: voltage or current cycle exceeding range means
            // invalid values.
            return Err(DiscardReason::AbnormalCondition(flags));
        }
        power_cycle_exceeds_range = flags.contains(HeaderFlags::POWER_CYCLE_EXCEEDS_RANGE);
    }

    let fields = parse_fields(frame).map_err(|_| DiscardReason::MalformedBody)?;

    let have_power = fields.adjustment.contains(AdjustmentFlags::POWER);
    let have_current = fields.adjustment.contains(AdjustmentFlags::CURRENT);
    let have_voltage = fields.adjustment.contains(AdjustmentFlags::VOLTAGE);

    let mut result = DecodeResult::default();

    if have_voltage {
        result.voltage = Some(fields.voltage_coefficient as f32 / fields.voltage_cycle as f32);
    }

    let mut power = 0.0f32;
    if have_power {
        // Datasheet: power cycle exceeding range means active power is 0.
        if !power_cycle_exceeds_range {
            power = fields.power_coefficient as f32 / fields.power_cycle as f32;
        }
        result.power = Some(power);

        // CF pulses feed the energy total whenever we have a power
        // coefficient to multiply by.
        result.energy_increment =
            Some(totalizer.accumulate_pulses(fields.power_coefficient, fields.cf_pulses));
    }

    if have_current {
        let mut current = 0.0f32;
        if have_voltage && !have_power {
            // Voltage and current but no power means the power is 0, which
            // in turn means the current is 0.
            result.implied_zero_power = true;
        } else if power != 0.0 {
            current = fields.current_coefficient as f32 / fields.current_cycle as f32;
        }
        result.current = Some(current);
    }

    trace!(
        "decoded frame: V={:?} I={:?} P={:?} E+={:?} (cf={})",
        result.voltage,
        result.current,
        result.power,
        result.energy_increment,
        fields.cf_pulses
    );

    Ok(result)
}
