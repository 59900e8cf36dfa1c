//! # CSE7766 Meter
//!
//! Ties the frame assembler, field decoder, per-quantity accumulators and
//! the energy totalizer together behind a two-call surface: `poll` is
//! driven at whatever cadence bytes arrive, `publish` on a slower periodic
//! cadence. Between publishes the meter averages every decoded sample, so
//! the slow consumer sees the mean of the fast frame stream rather than a
//! point sample.

use crate::cse7766::accumulator::{Accumulator, EnergyTotalizer};
use crate::cse7766::assembler::{AssemblerEvent, ByteSource, FrameAssembler};
use crate::cse7766::decode::{decode, DecodeResult, DiscardReason};
use log::{debug, error, trace};

/// Outcome of processing one frame boundary event, returned to the caller
/// so it can surface warnings however it sees fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Frame validated and decoded; quantities were accumulated.
    Accepted(DecodeResult),
    /// A byte failed header or checksum validation and frame search
    /// restarted.
    Resynced,
    /// A structurally valid frame carried no usable data.
    Discarded(DiscardReason),
}

/// Averaged readings for one publish window. Each quantity is `Some` only
/// if at least one sample arrived since the previous publish.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeterReadings {
    /// Mean voltage over the window, volts.
    pub voltage: Option<f32>,
    /// Mean current over the window, amperes.
    pub current: Option<f32>,
    /// Mean active power over the window, watts.
    pub power: Option<f32>,
    /// Lifetime cumulative energy, kWh. Present whenever a power-bearing
    /// frame arrived during the window; a running total, not a delta.
    pub energy: Option<f32>,
}

/// Decoder state for one CSE7766 chip.
#[derive(Debug, Default)]
pub struct Cse7766Meter {
    assembler: FrameAssembler,
    voltage: Accumulator,
    current: Accumulator,
    power: Accumulator,
    totalizer: EnergyTotalizer,
}

impl Cse7766Meter {
    pub fn new() -> Self {
        Cse7766Meter::default()
    }

    /// Drains available bytes from `source`, decoding and accumulating any
    /// completed frames. `now_ms` is a monotonic millisecond clock.
    pub fn poll(&mut self, source: &mut dyn ByteSource, now_ms: u32) -> Vec<FrameOutcome> {
        let mut events = Vec::new();
        self.assembler.poll(source, now_ms, &mut events);

        events
            .into_iter()
            .map(|event| match event {
                AssemblerEvent::Resynced { .. } => FrameOutcome::Resynced,
                AssemblerEvent::FrameComplete(frame) => {
                    trace!("raw frame: {}", hex::encode_upper(frame.as_bytes()));
                    match decode(&frame, &mut self.totalizer) {
                        Ok(result) => {
                            self.accumulate(&result);
                            FrameOutcome::Accepted(result)
                        }
                        Err(reason) => {
                            error!("frame discarded: {reason}");
                            FrameOutcome::Discarded(reason)
                        }
                    }
                }
            })
            .collect()
    }

    fn accumulate(&mut self, result: &DecodeResult) {
        if let Some(v) = result.voltage {
            self.voltage.accumulate(v);
        }
        if let Some(i) = result.current {
            self.current.accumulate(i);
        }
        if let Some(p) = result.power {
            self.power.accumulate(p);
        }
        if result.implied_zero_power {
            // No power field alongside voltage and current means zero power
            // draw; it still counts as a sample in the window average.
            self.power.accumulate(0.0);
        }
    }

    /// Computes the window averages, resets the accumulators and returns
    /// the readings. Quantities with no samples are left unset rather than
    /// reported as zero.
    pub fn publish(&mut self) -> MeterReadings {
        let readings = MeterReadings {
            voltage: self.voltage.drain_average(),
            current: self.current.drain_average(),
            power: self.power.drain_average(),
            energy: self.totalizer.drain_if_any(),
        };
        debug!(
            "publish: V={:?} I={:?} P={:?} E={:?}",
            readings.voltage, readings.current, readings.power, readings.energy
        );
        readings
    }

    /// Lifetime cumulative energy total in kWh, regardless of publish state.
    pub fn energy_total(&self) -> f32 {
        self.totalizer.total()
    }
}
