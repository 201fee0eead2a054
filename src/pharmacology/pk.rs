//! Pharmacokinetic models.
//!
//! The variant set is closed: `PkModel` is matched in one place when the
//! integrator builds compartment derivatives. Concentrations are in mg/L
//! (central, peripheral), the depot holds an amount in mg and activity
//! engagement is a dimensionless index in [0, 1].
//!
//! Dosing:
//! - positive duration: zero-order input of F * dose spread evenly across the
//!   window, straight into the central compartment
//! - zero duration: bolus into a depot, absorbed first-order with ka solved
//!   from the declared time-to-peak
//!
//! References:
//! - Rowland M, Tozer TN. Clinical Pharmacokinetics and Pharmacodynamics. 4th ed. 2010
//! - Holford NHG. Clin Pharmacokinet. 1986;11:483-504 (ethanol, saturable elimination)

use serde::{Deserialize, Serialize};

use super::kinetics::{ka_from_tmax, michaelis_menten};
use crate::subject::Physiology;

/// Volume of distribution, scaled against the subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VolumeOfDistribution {
    LitersPerKg(f64),
    LitersPerKgLeanMass(f64),
    TotalBodyWaterFraction(f64),
    Liters(f64),
}

impl VolumeOfDistribution {
    /// Absolute volume in litres for this subject
    pub fn liters(&self, physiology: &Physiology) -> f64 {
        match *self {
            VolumeOfDistribution::LitersPerKg(v) => v * physiology.weight_kg,
            VolumeOfDistribution::LitersPerKgLeanMass(v) => v * physiology.lean_body_mass_kg,
            VolumeOfDistribution::TotalBodyWaterFraction(f) => f * physiology.total_body_water_l,
            VolumeOfDistribution::Liters(v) => v,
        }
    }

    pub fn raw_value(&self) -> f64 {
        match *self {
            VolumeOfDistribution::LitersPerKg(v)
            | VolumeOfDistribution::LitersPerKgLeanMass(v)
            | VolumeOfDistribution::TotalBodyWaterFraction(v)
            | VolumeOfDistribution::Liters(v) => v,
        }
    }
}

/// Declared PK model of an intervention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PkModel {
    /// First-order absorption and elimination
    OneCompartment {
        bioavailability: f64,
        half_life_min: f64,
        time_to_peak_min: f64,
        volume: VolumeOfDistribution,
    },
    /// Adds a peripheral compartment for redistribution of lipophilic agents
    TwoCompartment {
        bioavailability: f64,
        /// Elimination half-life from the central compartment
        half_life_min: f64,
        time_to_peak_min: f64,
        central_volume: VolumeOfDistribution,
        peripheral_volume: VolumeOfDistribution,
        intercompartmental_clearance_l_per_min: f64,
    },
    /// Saturable elimination (non-exponential decay)
    MichaelisMenten {
        bioavailability: f64,
        time_to_peak_min: f64,
        vmax_mg_per_l_per_min: f64,
        km_mg_per_l: f64,
        volume: VolumeOfDistribution,
    },
    /// Engagement rises toward 1 while active and decays toward 0 afterwards
    ActivityDependent { rise_tau_min: f64, decay_tau_min: f64 },
}

impl PkModel {
    pub fn name(&self) -> &'static str {
        match self {
            PkModel::OneCompartment { .. } => "one_compartment",
            PkModel::TwoCompartment { .. } => "two_compartment",
            PkModel::MichaelisMenten { .. } => "michaelis_menten",
            PkModel::ActivityDependent { .. } => "activity_dependent",
        }
    }

    pub fn is_activity(&self) -> bool {
        matches!(self, PkModel::ActivityDependent { .. })
    }

    pub fn has_peripheral(&self) -> bool {
        matches!(self, PkModel::TwoCompartment { .. })
    }
}

/// Elimination law of a resolved substance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Elimination {
    FirstOrder { ke_per_min: f64 },
    Saturable { vmax_mg_per_l_per_min: f64, km_mg_per_l: f64 },
}

/// Peripheral compartment of a resolved two-compartment model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peripheral {
    pub volume_l: f64,
    pub clearance_l_per_min: f64,
}

/// PK model resolved against one subject and dose
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PkParameters {
    Substance {
        bioavailability: f64,
        ka_per_min: f64,
        central_volume_l: f64,
        elimination: Elimination,
        peripheral: Option<Peripheral>,
        /// Nominal peak concentration F * dose / Vc (mg/L)
        reference_mg_per_l: f64,
    },
    Activity { rise_tau_min: f64, decay_tau_min: f64 },
}

/// Compartment derivatives of one instance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompartmentRates {
    pub depot: f64,
    pub central: f64,
    pub peripheral: f64,
    pub effect: f64,
}

/// Compartment values of one instance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompartmentValues {
    /// Amount awaiting absorption (mg)
    pub depot: f64,
    /// Concentration (mg/L)
    pub central: f64,
    /// Concentration (mg/L)
    pub peripheral: f64,
    /// Activity engagement (index)
    pub effect: f64,
}

#[inline]
fn rate_constant(half_life_min: f64) -> f64 {
    if half_life_min > 0.0 {
        std::f64::consts::LN_2 / half_life_min
    } else {
        0.0
    }
}

/// Resolve a declared PK model against a dose and the subject's physiology
///
/// First-order rate constants are scaled by the drug-clearance scalar and
/// Vmax by metabolic capacity. The absorption constant is solved from the
/// scaled elimination constant so the declared time-to-peak holds for this
/// subject.
pub fn resolve_pk(model: &PkModel, dose_mg: f64, physiology: &Physiology) -> PkParameters {
    let reference = |f: f64, v: f64| if v > 0.0 { (f * dose_mg / v).max(0.0) } else { 0.0 };
    match *model {
        PkModel::OneCompartment {
            bioavailability,
            half_life_min,
            time_to_peak_min,
            volume,
        } => {
            let ke = rate_constant(half_life_min) * physiology.drug_clearance_scalar;
            let vc = volume.liters(physiology);
            PkParameters::Substance {
                bioavailability,
                ka_per_min: ka_from_tmax(ke, time_to_peak_min),
                central_volume_l: vc,
                elimination: Elimination::FirstOrder { ke_per_min: ke },
                peripheral: None,
                reference_mg_per_l: reference(bioavailability, vc),
            }
        }
        PkModel::TwoCompartment {
            bioavailability,
            half_life_min,
            time_to_peak_min,
            central_volume,
            peripheral_volume,
            intercompartmental_clearance_l_per_min,
        } => {
            let ke = rate_constant(half_life_min) * physiology.drug_clearance_scalar;
            let vc = central_volume.liters(physiology);
            PkParameters::Substance {
                bioavailability,
                ka_per_min: ka_from_tmax(ke, time_to_peak_min),
                central_volume_l: vc,
                elimination: Elimination::FirstOrder { ke_per_min: ke },
                peripheral: Some(Peripheral {
                    volume_l: peripheral_volume.liters(physiology),
                    clearance_l_per_min: intercompartmental_clearance_l_per_min,
                }),
                reference_mg_per_l: reference(bioavailability, vc),
            }
        }
        PkModel::MichaelisMenten {
            bioavailability,
            time_to_peak_min,
            vmax_mg_per_l_per_min,
            km_mg_per_l,
            volume,
        } => {
            let vc = volume.liters(physiology);
            let vmax = vmax_mg_per_l_per_min * physiology.metabolic_capacity;
            // Absorption uses the apparent first-order rate at C = Km
            let apparent_ke = if km_mg_per_l > 0.0 { 0.5 * vmax / km_mg_per_l } else { 0.0 };
            PkParameters::Substance {
                bioavailability,
                ka_per_min: ka_from_tmax(apparent_ke, time_to_peak_min),
                central_volume_l: vc,
                elimination: Elimination::Saturable {
                    vmax_mg_per_l_per_min: vmax,
                    km_mg_per_l,
                },
                peripheral: None,
                reference_mg_per_l: reference(bioavailability, vc),
            }
        }
        PkModel::ActivityDependent {
            rise_tau_min,
            decay_tau_min,
        } => PkParameters::Activity {
            rise_tau_min,
            decay_tau_min,
        },
    }
}

impl PkParameters {
    /// Concentration treated as full scale when no potency is declared
    pub fn reference_level(&self) -> f64 {
        match self {
            PkParameters::Substance { reference_mg_per_l, .. } => *reference_mg_per_l,
            PkParameters::Activity { .. } => 1.0,
        }
    }

    pub fn is_activity(&self) -> bool {
        matches!(self, PkParameters::Activity { .. })
    }

    /// Compartment derivatives for one instance
    ///
    /// # Arguments
    /// * `values` - Current compartment values of the instance
    /// * `input_mg_per_min` - Zero-order input into central (0 outside the window)
    /// * `active` - Whether an activity is ongoing
    pub fn rates(&self, values: &CompartmentValues, input_mg_per_min: f64, active: bool) -> CompartmentRates {
        match *self {
            PkParameters::Substance {
                ka_per_min,
                central_volume_l,
                elimination,
                peripheral,
                ..
            } => {
                if central_volume_l <= 0.0 {
                    return CompartmentRates::default();
                }
                let absorbed = ka_per_min * values.depot.max(0.0);
                let c = values.central.max(0.0);
                let eliminated = match elimination {
                    Elimination::FirstOrder { ke_per_min } => ke_per_min * c,
                    Elimination::Saturable {
                        vmax_mg_per_l_per_min,
                        km_mg_per_l,
                    } => michaelis_menten(vmax_mg_per_l_per_min, km_mg_per_l, c),
                };
                let mut rates = CompartmentRates {
                    depot: -absorbed,
                    central: (absorbed + input_mg_per_min) / central_volume_l - eliminated,
                    ..Default::default()
                };
                if let Some(p) = peripheral {
                    if p.volume_l > 0.0 {
                        let gradient = c - values.peripheral.max(0.0);
                        rates.central -= p.clearance_l_per_min * gradient / central_volume_l;
                        rates.peripheral = p.clearance_l_per_min * gradient / p.volume_l;
                    }
                }
                rates
            }
            PkParameters::Activity {
                rise_tau_min,
                decay_tau_min,
            } => {
                let e = values.effect;
                let effect = if active {
                    if rise_tau_min > 0.0 {
                        (1.0 - e) / rise_tau_min
                    } else {
                        0.0
                    }
                } else if decay_tau_min > 0.0 {
                    -e / decay_tau_min
                } else {
                    0.0
                };
                CompartmentRates {
                    effect,
                    ..Default::default()
                }
            }
        }
    }

    /// Amount placed in the depot by a bolus dose
    pub fn bolus_mg(&self, dose_mg: f64) -> f64 {
        match self {
            PkParameters::Substance { bioavailability, .. } => (bioavailability * dose_mg).max(0.0),
            PkParameters::Activity { .. } => 0.0,
        }
    }

    /// Zero-order input rate while a timed dose is running
    pub fn infusion_rate(&self, dose_mg: f64, duration_min: f64) -> f64 {
        match self {
            PkParameters::Substance { bioavailability, .. } if duration_min > 0.0 => {
                (bioavailability * dose_mg / duration_min).max(0.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_compartment() -> PkModel {
        PkModel::OneCompartment {
            bioavailability: 1.0,
            half_life_min: 300.0,
            time_to_peak_min: 45.0,
            volume: VolumeOfDistribution::LitersPerKg(0.6),
        }
    }

    #[test]
    fn test_volume_scaling() {
        let p = Physiology::default();
        assert!((VolumeOfDistribution::LitersPerKg(0.6).liters(&p) - 42.0).abs() < 1e-9);
        assert!((VolumeOfDistribution::Liters(5.0).liters(&p) - 5.0).abs() < 1e-12);
        let tbw = VolumeOfDistribution::TotalBodyWaterFraction(1.0).liters(&p);
        assert!((tbw - p.total_body_water_l).abs() < 1e-12);
    }

    #[test]
    fn test_clearance_scalar_scales_ke() {
        let mut p = Physiology::default();
        let base = resolve_pk(&one_compartment(), 100.0, &p);
        p.drug_clearance_scalar = 2.0;
        let fast = resolve_pk(&one_compartment(), 100.0, &p);
        let ke = |pk: &PkParameters| match pk {
            PkParameters::Substance {
                elimination: Elimination::FirstOrder { ke_per_min },
                ..
            } => *ke_per_min,
            _ => 0.0,
        };
        assert!((ke(&fast) - 2.0 * ke(&base)).abs() < 1e-12);
    }

    #[test]
    fn test_reference_concentration() {
        let pk = resolve_pk(&one_compartment(), 84.0, &Physiology::default());
        // 84 mg into 42 L
        assert!((pk.reference_level() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_compartment_conserves_mass_without_elimination() {
        let pk = PkParameters::Substance {
            bioavailability: 1.0,
            ka_per_min: 0.1,
            central_volume_l: 10.0,
            elimination: Elimination::FirstOrder { ke_per_min: 0.0 },
            peripheral: Some(Peripheral {
                volume_l: 30.0,
                clearance_l_per_min: 0.5,
            }),
            reference_mg_per_l: 1.0,
        };
        let values = CompartmentValues {
            depot: 0.0,
            central: 2.0,
            peripheral: 0.5,
            effect: 0.0,
        };
        let r = pk.rates(&values, 0.0, false);
        // d(amount)/dt sums to zero across compartments
        let net = r.central * 10.0 + r.peripheral * 30.0;
        assert!(net.abs() < 1e-12);
        assert!(r.central < 0.0 && r.peripheral > 0.0);
    }

    #[test]
    fn test_activity_rise_and_decay() {
        let pk = PkParameters::Activity {
            rise_tau_min: 10.0,
            decay_tau_min: 20.0,
        };
        let v = CompartmentValues {
            effect: 0.5,
            ..Default::default()
        };
        assert!((pk.rates(&v, 0.0, true).effect - 0.05).abs() < 1e-12);
        assert!((pk.rates(&v, 0.0, false).effect + 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_saturable_decay_is_nearly_linear_above_km() {
        let pk = PkParameters::Substance {
            bioavailability: 1.0,
            ka_per_min: 0.1,
            central_volume_l: 40.0,
            elimination: Elimination::Saturable {
                vmax_mg_per_l_per_min: 2.0,
                km_mg_per_l: 50.0,
            },
            peripheral: None,
            reference_mg_per_l: 1.0,
        };
        let high = pk.rates(&CompartmentValues { central: 1000.0, ..Default::default() }, 0.0, false);
        let higher = pk.rates(&CompartmentValues { central: 2000.0, ..Default::default() }, 0.0, false);
        // Doubling concentration barely changes the rate (zero-order regime)
        assert!(higher.central / high.central < 1.1);
    }
}
