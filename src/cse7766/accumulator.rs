//! # Accumulation and Averaging
//!
//! The chip emits frames several times per second while readings are
//! published on a much slower cadence. This module provides the running
//! sum/count accumulator used per quantity, and the energy totalizer that
//! turns the free-running 16-bit CF pulse counter into a lifetime energy
//! total via wraparound-aware differencing.

use crate::constants::CF_PULSE_MODULUS;

/// Running sum and sample count for one quantity (voltage, current or
/// power) across one publish window.
#[derive(Debug, Default, Clone, Copy)]
pub struct Accumulator {
    sum: f32,
    count: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Adds one sample to the window.
    pub fn accumulate(&mut self, value: f32) {
        self.sum += value;
        self.count += 1;
    }

    /// Number of samples in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the window average and resets the window, or `None` if no
    /// sample arrived since the last drain. No zero is ever invented.
    pub fn drain_average(&mut self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let avg = self.sum / self.count as f32;
        self.sum = 0.0;
        self.count = 0;
        Some(avg)
    }
}

/// Converts the monotonically-cycling 16-bit CF pulse counter into a
/// cumulative energy total.
///
/// The lifetime total only ever grows; draining resets the publish-pending
/// sample count but never the total.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnergyTotalizer {
    last_pulses: Option<u16>,
    total_kwh: f32,
    pending: u32,
}

impl EnergyTotalizer {
    pub fn new() -> Self {
        EnergyTotalizer::default()
    }

    /// Folds one frame's pulse counter reading into the total and returns
    /// this frame's energy increment in kWh.
    ///
    /// The very first call only records the baseline: there is nothing to
    /// diff against, so the increment is zero.
    pub fn accumulate_pulses(&mut self, power_coefficient: u32, pulses: u16) -> f32 {
        let diff = match self.last_pulses {
            None => 0,
            Some(last) if pulses < last => u32::from(pulses) + (CF_PULSE_MODULUS - u32::from(last)),
            Some(last) => u32::from(pulses - last),
        };
        self.last_pulses = Some(pulses);

        let increment = diff as f32 * power_coefficient as f32 / 1_000_000.0 / 3600.0;
        self.total_kwh += increment;
        self.pending += 1;
        increment
    }

    /// Lifetime cumulative energy total in kWh.
    pub fn total(&self) -> f32 {
        self.total_kwh
    }

    /// Returns the lifetime total if any power-bearing frame arrived since
    /// the last drain, resetting only the pending count.
    pub fn drain_if_any(&mut self) -> Option<f32> {
        if self.pending == 0 {
            return None;
        }
        self.pending = 0;
        Some(self.total_kwh)
    }
}
