//! Integration tests for intervention pharmacokinetics.
//!
//! Tests verify:
//! - Zero-order infusion rises for the whole window and decays after it
//! - An instantaneous dose peaks near its declared time-to-peak
//! - Instances sharing an id but not a start keep separate compartments
//! - Doses before the grid start are already in the body at minute 0

use physio_sim::pharmacology::{Molecule, PkModel, VolumeOfDistribution};
use physio_sim::{compute, InterventionInstance, InterventionLibrary, Pharmacology, RequestBuilder, TimeGrid};

fn tracer() -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("tracer", 250.0),
        100.0,
        PkModel::OneCompartment {
            bioavailability: 1.0,
            half_life_min: 120.0,
            time_to_peak_min: 60.0,
            volume: VolumeOfDistribution::Liters(40.0),
        },
        vec![],
    )
}

fn central_at(values: &[f64], minutes: &[f64], minute: f64) -> f64 {
    let i = minutes.iter().position(|&m| m == minute).expect("minute on grid");
    values[i]
}

#[test]
fn test_infusion_rises_then_decays() {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::uniform(0.0, 600.0, 5.0))
        .instance(InterventionInstance::new("drip", "tracer", 60.0, 60.0).with_pharmacology(tracer()))
        .build();
    let response = compute(&request);
    let series = response.compartment("drip", 60.0).expect("drip compartment");
    let minutes = &response.minutes;

    assert_eq!(central_at(&series.values, minutes, 60.0), 0.0, "nothing before the window");
    for (i, pair) in series.values.windows(2).enumerate() {
        let (m0, m1) = (minutes[i], minutes[i + 1]);
        if m0 >= 60.0 && m1 <= 120.0 {
            assert!(pair[1] > pair[0], "infusion should rise between {} and {}", m0, m1);
        } else if m0 >= 120.0 {
            assert!(pair[1] < pair[0], "should decay after the window, {} -> {}", m0, m1);
        }
    }
}

#[test]
fn test_bolus_peaks_near_time_to_peak() {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::uniform(0.0, 720.0, 5.0))
        .instance(InterventionInstance::new("pill", "tracer", 60.0, 0.0).with_pharmacology(tracer()))
        .build();
    let response = compute(&request);
    let series = response.compartment("pill", 60.0).expect("pill compartment");
    let (peak_index, _) = series
        .values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .expect("non-empty series");
    let peak_minute = response.minutes[peak_index];
    assert!(
        (peak_minute - 120.0).abs() <= 15.0,
        "bolus at 60 with tmax 60 should peak near 120, got {}",
        peak_minute
    );
}

#[test]
fn test_recurring_id_keeps_separate_compartments() {
    let library = InterventionLibrary::builtin();
    let grid = TimeGrid::uniform(0.0, 1200.0, 5.0);
    let single = compute(
        &RequestBuilder::new(&library, grid.clone())
            .intervention("coffee", "caffeine", 480.0)
            .build(),
    );
    let double = compute(
        &RequestBuilder::new(&library, grid)
            .intervention("coffee", "caffeine", 480.0)
            .intervention("coffee", "caffeine", 900.0)
            .build(),
    );

    let first_alone = single.compartment("coffee", 480.0).expect("first dose");
    let first = double.compartment("coffee", 480.0).expect("first dose");
    let second = double.compartment("coffee", 900.0).expect("second dose");
    assert_eq!(double.compartment_series.len(), 2);
    assert_eq!(first.values, first_alone.values, "second dose must not touch the first");

    for (minute, value) in double.minutes.iter().zip(&second.values) {
        if *minute < 900.0 {
            assert_eq!(*value, 0.0, "second dose present at {}", minute);
        }
    }
    assert!(second.values.iter().any(|&v| v > 0.0));
}

#[test]
fn test_dose_before_grid_is_present_at_start() {
    let library = InterventionLibrary::builtin();
    let request = RequestBuilder::new(&library, TimeGrid::uniform(600.0, 900.0, 5.0))
        .instance(InterventionInstance::new("early", "tracer", 540.0, 0.0).with_pharmacology(tracer()))
        .build();
    let response = compute(&request);
    let series = response.compartment("early", 540.0).expect("early compartment");
    assert!(series.values[1] > 0.0, "pre-grid dose should be absorbing");
    assert!(series.values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_unknown_intervention_is_a_no_op() {
    let library = InterventionLibrary::builtin();
    let grid = TimeGrid::uniform(0.0, 300.0, 10.0);
    let with_unknown = compute(
        &RequestBuilder::new(&library, grid.clone())
            .intervention("x", "unobtainium", 60.0)
            .build(),
    );
    let empty = compute(&RequestBuilder::new(&library, grid).build());
    assert_eq!(with_unknown.series, empty.series);
    assert!(with_unknown.compartment_series.is_empty());
}
