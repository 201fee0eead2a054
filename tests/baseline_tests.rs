//! Integration tests for circadian baselines.
//!
//! Tests verify:
//! - Every setpoint repeats after 1440 minutes
//! - The one-minute derivative has no jump at the midnight wrap
//! - Both sleep contexts and shifted contexts behave the same way

use physio_sim::baseline::{setpoint, BaselineContext, BaselineShift};
use physio_sim::Signal;

fn contexts() -> Vec<(&'static str, BaselineContext)> {
    let mut shifted = BaselineContext {
        chronotype_shift_min: 90.0,
        ..Default::default()
    };
    shifted.shifts.set(
        Signal::Melatonin,
        BaselineShift {
            amplitude: 0.7,
            phase_shift_min: 150.0,
        },
    );
    vec![
        ("awake", BaselineContext::awake()),
        ("asleep", BaselineContext::asleep()),
        ("shifted", shifted),
    ]
}

#[test]
fn test_setpoints_are_periodic() {
    for (label, ctx) in contexts() {
        for signal in Signal::ALL {
            let mut minute = 0.0;
            while minute < 1440.0 {
                let a = setpoint(signal, minute, &ctx);
                let b = setpoint(signal, minute + 1440.0, &ctx);
                let c = setpoint(signal, minute + 3.0 * 1440.0, &ctx);
                assert!(
                    (a - b).abs() < 1e-9 && (a - c).abs() < 1e-9,
                    "{} ({}) not periodic at minute {}: {} vs {} vs {}",
                    signal,
                    label,
                    minute,
                    a,
                    b,
                    c
                );
                minute += 7.3;
            }
        }
    }
}

#[test]
fn test_midnight_derivative_is_continuous() {
    for (label, ctx) in contexts() {
        for signal in Signal::ALL {
            let f = |m: f64| setpoint(signal, m, &ctx);
            let before = f(1440.0) - f(1439.0);
            let after = f(1441.0) - f(1440.0);
            let tolerance = 0.01 * signal.spec().reference;
            assert!(
                (after - before).abs() < tolerance,
                "{} ({}) derivative jumps at midnight: {:.5} -> {:.5}",
                signal,
                label,
                before,
                after
            );
        }
    }
}

#[test]
fn test_setpoints_within_bounds() {
    for (_, ctx) in contexts() {
        for signal in Signal::ALL {
            let spec = signal.spec();
            for m in (0..1440).step_by(15) {
                let v = setpoint(signal, m as f64, &ctx);
                assert!(
                    v >= spec.min && v <= spec.max,
                    "{} setpoint {} outside [{}, {}] at {}",
                    signal,
                    v,
                    spec.min,
                    spec.max,
                    m
                );
            }
        }
    }
}
