//! End-to-end scenario tests over multi-day grids.
//!
//! Tests verify:
//! - With only nightly sleep, melatonin peaks inside the sleep window
//! - Melatonin is back on its daytime setpoint after waking
//! - Euler and RK4 agree on the sleep-only run and on a busy day
//! - A realistic day of interventions stays finite and in bounds
//! - Conditions shift the signals they are meant to shift

use physio_sim::baseline::{setpoint, BaselineContext};
use physio_sim::{
    compute, ComputeResponse, InterventionLibrary, IntegrationMethod, RequestBuilder, Signal, TimeGrid,
};

/// Two days on a 5-minute grid with sleep from 22:00 to 06:00 as the only intervention
fn sleep_only_scenario(method: IntegrationMethod) -> ComputeResponse {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::days(2.0, 5.0))
        .method(method)
        .daily("night", "sleep", 1320.0, 480.0, 2)
        .build();
    compute(&request)
}

fn two_day_scenario(method: IntegrationMethod) -> ComputeResponse {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::days(2.0, 5.0))
        .method(method)
        .daily("night", "sleep", 1320.0, 480.0, 2)
        .daily("coffee", "caffeine", 450.0, 0.0, 2)
        .daily("lunch", "meal", 750.0, 30.0, 2)
        .daily("walk", "exercise", 1020.0, 45.0, 2)
        .build();
    compute(&request)
}

// ============================================================================
// Circadian shape
// ============================================================================

#[test]
fn test_melatonin_peaks_during_sleep_window() {
    let response = sleep_only_scenario(IntegrationMethod::Euler);
    let melatonin = response.signal(Signal::Melatonin);
    let (peak_minute, peak) = response
        .minutes
        .iter()
        .zip(melatonin)
        .filter(|(m, _)| **m >= 1200.0 && **m <= 2000.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(m, v)| (*m, *v))
        .expect("night window on grid");

    assert!(
        (1320.0..1800.0).contains(&peak_minute),
        "melatonin peak at minute {} is outside the sleep window 1320..1800",
        peak_minute
    );

    let noon = response.value_at(Signal::Melatonin, 2160.0).unwrap_or(f64::NAN);
    assert!(
        noon < 0.25 * peak,
        "melatonin at day-2 noon ({}) should be far below the night peak ({})",
        noon,
        peak
    );
}

#[test]
fn test_melatonin_returns_to_baseline_after_wake() {
    let response = sleep_only_scenario(IntegrationMethod::Euler);
    let context = BaselineContext::awake();
    let tolerance = 0.1 * Signal::Melatonin.spec().reference;
    // Two hours after waking through the next lights-out
    for (minute, value) in response.minutes.iter().zip(response.signal(Signal::Melatonin)) {
        if *minute < 2040.0 || *minute >= 2760.0 {
            continue;
        }
        let baseline = setpoint(Signal::Melatonin, *minute, &context);
        assert!(
            (value - baseline).abs() <= tolerance,
            "melatonin {} at minute {} is not back near its baseline {}",
            value,
            minute,
            baseline
        );
    }
}

#[test]
fn test_sleep_only_euler_matches_rk4() {
    let euler = sleep_only_scenario(IntegrationMethod::Euler);
    let rk4 = sleep_only_scenario(IntegrationMethod::RungeKutta4);
    for signal in Signal::ALL {
        let tolerance = 0.05 * signal.spec().reference;
        for (i, (a, b)) in euler.signal(signal).iter().zip(rk4.signal(signal)).enumerate() {
            assert!(
                (a - b).abs() <= tolerance,
                "{} diverges between methods at minute {}: Euler {} vs RK4 {}",
                signal,
                euler.minutes[i],
                a,
                b
            );
        }
    }
}

#[test]
fn test_scenario_stays_in_bounds() {
    let response = two_day_scenario(IntegrationMethod::RungeKutta4);
    assert_eq!(response.repaired_values, 0, "no non-finite values expected");
    for signal in Signal::ALL {
        let spec = signal.spec();
        for (minute, v) in response.minutes.iter().zip(response.signal(signal)) {
            assert!(
                v.is_finite() && *v >= spec.min && *v <= spec.max,
                "{} = {} out of bounds at minute {}",
                signal,
                v,
                minute
            );
        }
    }
    assert_eq!(response.compartment_series.len(), 8);
    assert_eq!(response.homeostasis_series.len(), response.minutes.len());
}

#[test]
fn test_euler_matches_rk4() {
    let rk4 = two_day_scenario(IntegrationMethod::RungeKutta4);
    let euler = two_day_scenario(IntegrationMethod::Euler);
    for signal in Signal::ALL {
        let tolerance = 0.05 * signal.spec().reference;
        for (i, (a, b)) in rk4.signal(signal).iter().zip(euler.signal(signal)).enumerate() {
            assert!(
                (a - b).abs() <= tolerance,
                "{} diverges between methods at minute {}: RK4 {} vs Euler {}",
                signal,
                rk4.minutes[i],
                a,
                b
            );
        }
    }
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_adhd_lowers_dopamine() {
    let library = InterventionLibrary::builtin();
    let grid = TimeGrid::days(1.0, 10.0);
    let baseline = compute(&RequestBuilder::new(&library, grid.clone()).build());
    let adhd = compute(&RequestBuilder::new(&library, grid).condition("adhd", 1.0).build());
    let (base_mean, adhd_mean) = (
        baseline.mean(Signal::Dopamine).unwrap_or(0.0),
        adhd.mean(Signal::Dopamine).unwrap_or(0.0),
    );
    assert!(
        adhd_mean < base_mean,
        "ADHD mean dopamine {} should be below baseline {}",
        adhd_mean,
        base_mean
    );
}

#[test]
fn test_delayed_sleep_phase_delays_melatonin() {
    let library = InterventionLibrary::builtin();
    let grid = TimeGrid::days(1.0, 5.0);
    let baseline = compute(&RequestBuilder::new(&library, grid.clone()).build());
    let delayed = compute(
        &RequestBuilder::new(&library, grid)
            .condition("delayed_sleep_phase", 1.0)
            .build(),
    );
    let (base_peak, _) = baseline.peak(Signal::Melatonin).expect("baseline peak");
    let (delayed_peak, _) = delayed.peak(Signal::Melatonin).expect("delayed peak");
    assert!(
        delayed_peak > base_peak + 90.0,
        "delayed melatonin peak {} should come well after {}",
        delayed_peak,
        base_peak
    );
}
