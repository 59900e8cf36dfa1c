//! Unit tests for the `accumulator.rs` module: window averaging and the
//! wraparound-aware energy totalizer.

use cse7766_rs::{Accumulator, EnergyTotalizer};
use proptest::prelude::*;

/// Draining twice in a row yields a value then nothing: the window resets
/// after the first drain.
#[test]
fn test_drain_average_is_idempotent() {
    let mut acc = Accumulator::new();
    acc.accumulate(220.0);
    acc.accumulate(221.0);
    acc.accumulate(219.0);
    assert_eq!(acc.drain_average(), Some(220.0));
    assert_eq!(acc.drain_average(), None);
}

/// An empty window publishes nothing; no zero is invented.
#[test]
fn test_empty_window_publishes_nothing() {
    let mut acc = Accumulator::new();
    assert_eq!(acc.drain_average(), None);
}

/// Samples arriving after a drain start a fresh window.
#[test]
fn test_windows_are_independent() {
    let mut acc = Accumulator::new();
    acc.accumulate(10.0);
    assert_eq!(acc.drain_average(), Some(10.0));
    acc.accumulate(30.0);
    acc.accumulate(50.0);
    assert_eq!(acc.drain_average(), Some(40.0));
}

/// The first pulse reading is a baseline: no energy can be attributed to it.
#[test]
fn test_totalizer_first_reading_is_baseline() {
    let mut tot = EnergyTotalizer::new();
    assert_eq!(tot.accumulate_pulses(5_000_000, 4242), 0.0);
    assert_eq!(tot.total(), 0.0);
}

/// A pulse counter of zero is a legitimate first reading, not "unset".
#[test]
fn test_totalizer_zero_baseline() {
    let mut tot = EnergyTotalizer::new();
    assert_eq!(tot.accumulate_pulses(1_000_000, 0), 0.0);
    let inc = tot.accumulate_pulses(1_000_000, 36);
    assert!((inc - 36.0 / 3600.0).abs() < 1e-6);
}

/// Counter wraparound: 65530 followed by 5 is 11 pulses, not -65525.
#[test]
fn test_totalizer_wraparound() {
    let mut tot = EnergyTotalizer::new();
    tot.accumulate_pulses(1_000_000, 65530);
    let inc = tot.accumulate_pulses(1_000_000, 5);
    let expected = 11.0 / 3600.0;
    assert!((inc - expected).abs() < 1e-6, "got {inc}, want {expected}");
}

/// 50 pulses at a power coefficient of 5,000,000 add about 0.0694 kWh.
#[test]
fn test_totalizer_energy_scaling() {
    let mut tot = EnergyTotalizer::new();
    tot.accumulate_pulses(5_000_000, 100);
    let inc = tot.accumulate_pulses(5_000_000, 150);
    let expected = 50.0 * 5_000_000.0 / 1_000_000.0 / 3600.0;
    assert!((inc - expected).abs() < 1e-4);
    assert!((tot.total() - expected).abs() < 1e-4);
}

/// Draining reports the lifetime total, not a per-window delta, and only
/// while new pulses arrived; the total itself survives every drain.
#[test]
fn test_totalizer_drain_keeps_lifetime_total() {
    let mut tot = EnergyTotalizer::new();
    tot.accumulate_pulses(5_000_000, 100);
    tot.accumulate_pulses(5_000_000, 150);
    let total = tot.total();

    assert_eq!(tot.drain_if_any(), Some(total));
    assert_eq!(tot.drain_if_any(), None);

    tot.accumulate_pulses(5_000_000, 200);
    let drained = tot.drain_if_any().unwrap();
    assert!(drained > total);
    assert_eq!(tot.total(), drained);
}

proptest! {
    /// For any pair of consecutive counter readings the computed pulse
    /// difference equals the modular distance over 16 bits.
    #[test]
    fn prop_pulse_diff_is_modular_distance(last in any::<u16>(), next in any::<u16>()) {
        // With this coefficient one pulse is exactly 0.001 kWh.
        let coefficient = 3_600_000u32;
        let mut tot = EnergyTotalizer::new();
        tot.accumulate_pulses(coefficient, last);
        let inc = tot.accumulate_pulses(coefficient, next);

        let expected_diff = (u32::from(next) + 0x10000 - u32::from(last)) % 0x10000;
        let expected = expected_diff as f32 * 0.001;
        prop_assert!((inc - expected).abs() < 1e-3, "diff {expected_diff}: {inc} != {expected}");
    }
}
