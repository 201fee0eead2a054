//! Integration tests for transporter-mediated clearance.
//!
//! Tests verify:
//! - Reduced transporter activity in the profile raises the cleared signal
//! - Pharmacological reuptake blockade raises the cleared signal
//! - The transporters flag removes the profile effect

use physio_sim::{compute, DebugFlags, InterventionLibrary, ProfileAdjustments, RequestBuilder, Signal, TimeGrid};

fn grid() -> TimeGrid {
    TimeGrid::uniform(0.0, 1440.0, 10.0)
}

#[test]
fn test_reduced_dat_raises_dopamine() {
    let library = InterventionLibrary::builtin();
    let nominal = compute(&RequestBuilder::new(&library, grid()).build());
    let reduced = compute(
        &RequestBuilder::new(&library, grid())
            .profile(ProfileAdjustments::default().transporter("DAT", -0.3))
            .build(),
    );

    for (i, (low, high)) in nominal
        .signal(Signal::Dopamine)
        .iter()
        .zip(reduced.signal(Signal::Dopamine))
        .enumerate()
    {
        assert!(
            *high >= *low,
            "dopamine with DAT -0.3 fell below nominal at minute {}: {} < {}",
            nominal.minutes[i],
            high,
            low
        );
    }

    let nominal_mean = nominal.mean(Signal::Dopamine).unwrap_or(0.0);
    let reduced_mean = reduced.mean(Signal::Dopamine).unwrap_or(0.0);
    assert!(
        reduced_mean >= 1.1 * nominal_mean,
        "mean dopamine {} should exceed nominal {} by 10%",
        reduced_mean,
        nominal_mean
    );
}

#[test]
fn test_transporters_flag_removes_profile_effect() {
    let library = InterventionLibrary::builtin();
    let flags = DebugFlags::all().with("transporters", false);
    let nominal = compute(&RequestBuilder::new(&library, grid()).flags(flags).build());
    let reduced = compute(
        &RequestBuilder::new(&library, grid())
            .flags(flags)
            .profile(ProfileAdjustments::default().transporter("DAT", -0.3))
            .build(),
    );
    assert_eq!(
        nominal.signal(Signal::Dopamine),
        reduced.signal(Signal::Dopamine),
        "with transporters off the DAT profile has nothing to act on"
    );
}

#[test]
fn test_reuptake_blocker_raises_dopamine() {
    let library = InterventionLibrary::builtin();
    let undosed = compute(&RequestBuilder::new(&library, grid()).build());
    let dosed = compute(
        &RequestBuilder::new(&library, grid())
            .intervention("mph", "methylphenidate", 480.0)
            .build(),
    );
    let at = |r: &physio_sim::ComputeResponse| r.value_at(Signal::Dopamine, 600.0).unwrap_or(0.0);
    assert!(
        at(&dosed) > at(&undosed),
        "methylphenidate should raise dopamine two hours after dosing: {} vs {}",
        at(&dosed),
        at(&undosed)
    );
}
