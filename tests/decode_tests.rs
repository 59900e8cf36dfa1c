//! Unit tests for the `decode.rs` module: the datasheet error/range rules
//! and the physical-unit conversions.

use cse7766_rs::cse7766::decode::{decode, DiscardReason};
use cse7766_rs::cse7766::frame::{HeaderFlags, RawFrame};
use cse7766_rs::EnergyTotalizer;

fn put_u24(frame: &mut [u8; 24], offset: usize, value: u32) {
    frame[offset] = (value >> 16) as u8;
    frame[offset + 1] = (value >> 8) as u8;
    frame[offset + 2] = value as u8;
}

fn build_frame(
    header1: u8,
    voltage: (u32, u32),
    current: (u32, u32),
    power: (u32, u32),
    adjustment: u8,
    cf_pulses: u16,
) -> RawFrame {
    let mut f = [0u8; 24];
    f[0] = header1;
    f[1] = 0x5A;
    put_u24(&mut f, 2, voltage.0);
    put_u24(&mut f, 5, voltage.1);
    put_u24(&mut f, 8, current.0);
    put_u24(&mut f, 11, current.1);
    put_u24(&mut f, 14, power.0);
    put_u24(&mut f, 17, power.1);
    f[20] = adjustment;
    f[21] = (cf_pulses >> 8) as u8;
    f[22] = cf_pulses as u8;
    f[23] = f[2..=22].iter().fold(0u8, |s, b| s.wrapping_add(*b));
    RawFrame::from(f)
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-2,
        "expected {expected}, got {actual}"
    );
}

/// Header byte 0xAA marks an uncalibrated chip: the frame decodes to
/// nothing at all.
#[test]
fn test_uncalibrated_chip_aborts_decoding() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(0xAA, (1_000_000, 4545), (0, 1), (0, 1), 0x40, 0);
    assert_eq!(
        decode(&frame, &mut totalizer),
        Err(DiscardReason::NotCalibrated)
    );
    // The totalizer must not have been touched.
    assert_eq!(totalizer.drain_if_any(), None);
}

/// Voltage-cycle, current-cycle and storage-abnormal status bits each mark
/// the whole frame unusable, and the reason carries the exact bits.
#[test]
fn test_abnormal_status_bits_abort_decoding() {
    let mut totalizer = EnergyTotalizer::new();
    for (header1, expected) in [
        (0xF1, HeaderFlags::STORAGE_ABNORMAL),
        (0xF4, HeaderFlags::CURRENT_CYCLE_EXCEEDS_RANGE),
        (0xF8, HeaderFlags::VOLTAGE_CYCLE_EXCEEDS_RANGE),
        (
            0xF5,
            HeaderFlags::STORAGE_ABNORMAL | HeaderFlags::CURRENT_CYCLE_EXCEEDS_RANGE,
        ),
    ] {
        let frame = build_frame(header1, (1, 1), (1, 1), (1, 1), 0x70, 0);
        assert_eq!(
            decode(&frame, &mut totalizer),
            Err(DiscardReason::AbnormalCondition(expected)),
            "header1 {header1:#04X}"
        );
    }
}

/// Power-cycle-exceeds-range (header 0xF2) is recoverable: decoding
/// proceeds and active power is defined to be exactly zero, regardless of
/// the transmitted power coefficient and cycle.
#[test]
fn test_power_cycle_out_of_range_forces_zero_power() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(
        0xF2,
        (1_000_000, 4545),
        (100_000, 500),
        (5_000_000, 1000),
        0x70,
        0,
    );
    let result = decode(&frame, &mut totalizer).unwrap();
    assert_eq!(result.power, Some(0.0));
    // Zero power also implies zero current.
    assert_eq!(result.current, Some(0.0));
    assert_close(result.voltage.unwrap(), 1_000_000.0 / 4545.0);
    // The pulse counter still feeds the energy totalizer.
    assert_eq!(result.energy_increment, Some(0.0));
    assert_eq!(totalizer.drain_if_any(), Some(0.0));
}

/// A voltage-only frame produces only voltage.
#[test]
fn test_voltage_only_frame() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(0x55, (1_000_000, 4545), (1, 1), (1, 1), 0x40, 99);
    let result = decode(&frame, &mut totalizer).unwrap();
    assert_close(result.voltage.unwrap(), 220.02);
    assert_eq!(result.current, None);
    assert_eq!(result.power, None);
    assert_eq!(result.energy_increment, None);
    assert!(!result.implied_zero_power);
    // No power field, so the pulse counter is ignored.
    assert_eq!(totalizer.drain_if_any(), None);
}

/// A full frame converts every quantity as coefficient / cycle.
#[test]
fn test_full_frame_conversions() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(
        0x55,
        (1_000_000, 4545),
        (100_000, 500),
        (5_000_000, 25_000),
        0x70,
        100,
    );
    let result = decode(&frame, &mut totalizer).unwrap();
    assert_close(result.voltage.unwrap(), 220.02);
    assert_close(result.current.unwrap(), 200.0);
    assert_close(result.power.unwrap(), 200.0);
}

/// Voltage and current present without power: the chip implies zero power
/// draw. Current is forced to 0 and the frame is flagged as carrying an
/// implied zero power sample. This conflates "power absent" with "power
/// present and zero" for averaging, which matches observed chip behavior.
#[test]
fn test_voltage_and_current_without_power_quirk() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(0x55, (1_000_000, 4545), (100_000, 500), (1, 1), 0x60, 0);
    let result = decode(&frame, &mut totalizer).unwrap();
    assert_close(result.voltage.unwrap(), 220.02);
    assert_eq!(result.current, Some(0.0));
    assert_eq!(result.power, None);
    assert!(result.implied_zero_power);
}

/// A current-only frame reports zero current: with no voltage and no power
/// there is nothing to scale against.
#[test]
fn test_current_only_frame_reports_zero() {
    let mut totalizer = EnergyTotalizer::new();
    let frame = build_frame(0x55, (1, 1), (100_000, 500), (1, 1), 0x20, 0);
    let result = decode(&frame, &mut totalizer).unwrap();
    assert_eq!(result.current, Some(0.0));
    assert_eq!(result.voltage, None);
    assert_eq!(result.power, None);
    assert!(!result.implied_zero_power);
}

/// Two consecutive power-bearing frames advance the energy totalizer by
/// the pulse difference scaled by the power coefficient.
#[test]
fn test_energy_increment_between_frames() {
    let mut totalizer = EnergyTotalizer::new();
    let first = build_frame(0x55, (1, 1), (1, 1), (5_000_000, 25_000), 0x10, 100);
    let second = build_frame(0x55, (1, 1), (1, 1), (5_000_000, 25_000), 0x10, 150);

    let r1 = decode(&first, &mut totalizer).unwrap();
    assert_eq!(r1.energy_increment, Some(0.0)); // baseline only

    let r2 = decode(&second, &mut totalizer).unwrap();
    let expected = 50.0 * 5_000_000.0 / 1_000_000.0 / 3600.0;
    assert_close(r2.energy_increment.unwrap(), expected);
    assert_close(totalizer.total(), expected);
}
