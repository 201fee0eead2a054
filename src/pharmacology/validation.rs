//! Ahead-of-time validation of pharmacology.
//!
//! Problems are returned as records, never raised; callers decide whether to
//! block or warn. Checks:
//! - every PD target resolves to a registry entry or a signal key
//! - direct signal effects declare the signal's canonical unit
//! - registry-routed effects and modulators declare a dimensionless unit
//! - modulators act on registry entries, not on signals or pools
//! - numeric fields are finite and in range
//! - potency-based effects of substances have a molecule for nM conversion

use serde::Serialize;
use std::fmt;

use super::pk::{PkModel, VolumeOfDistribution};
use super::{InterventionLibrary, Pharmacology};
use crate::targets::{TargetKind, TargetRef, TargetRegistry};

/// One validation problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub intervention_key: String,
    /// Index into the PD effect list; `None` for PK-level problems
    pub target_index: Option<usize>,
    /// Target key as declared (or "pk")
    pub target: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_index {
            Some(i) => write!(f, "{}[{}] {}: {}", self.intervention_key, i, self.target, self.message),
            None => write!(f, "{} {}: {}", self.intervention_key, self.target, self.message),
        }
    }
}

/// Validate every definition of a library at its default parameters
pub fn validate_library(library: &InterventionLibrary) -> Vec<ValidationIssue> {
    library
        .definitions()
        .iter()
        .flat_map(|def| validate_pharmacology(def.key, &def.default_pharmacology()))
        .collect()
}

/// Validate one pharmacology value
pub fn validate_pharmacology(intervention_key: &str, pharmacology: &Pharmacology) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut pk_issue = |message: String| {
        issues.push(ValidationIssue {
            intervention_key: intervention_key.to_string(),
            target_index: None,
            target: "pk".to_string(),
            message,
        })
    };

    for message in pk_problems(&pharmacology.pk) {
        pk_issue(message);
    }
    if !pharmacology.pk.is_activity() {
        if !(pharmacology.dose_mg.is_finite() && pharmacology.dose_mg >= 0.0) {
            pk_issue(format!("dose must be finite and non-negative, got {}", pharmacology.dose_mg));
        }
        if let Some(m) = &pharmacology.molecule {
            if !(m.molar_mass_g_per_mol > 0.0) {
                pk_issue(format!("molar mass of '{}' must be positive", m.name));
            }
        } else if pharmacology.pd.iter().any(|e| e.potency_nm.is_some()) {
            pk_issue("potency requires a molecule to convert mg/L to nM".to_string());
        }
    }

    for (index, effect) in pharmacology.pd.iter().enumerate() {
        let mut issue = |message: String| {
            issues.push(ValidationIssue {
                intervention_key: intervention_key.to_string(),
                target_index: Some(index),
                target: effect.target.clone(),
                message,
            })
        };

        if !(effect.magnitude.is_finite() && effect.magnitude >= 0.0) {
            issue(format!("magnitude must be finite and non-negative, got {}", effect.magnitude));
        }
        if let Some(k) = effect.potency_nm {
            if !(k > 0.0 && k.is_finite()) {
                issue(format!("potency must be positive, got {}", k));
            }
        }
        if let Some(n) = effect.hill {
            if !(n > 0.0 && n.is_finite()) {
                issue(format!("hill coefficient must be positive, got {}", n));
            }
        }
        if let Some(tau) = effect.tau_min {
            if !(tau > 0.0 && tau.is_finite()) {
                issue(format!("tau must be positive, got {}", tau));
            }
        }

        match TargetRegistry::resolve(&effect.target) {
            None => issue("unknown pharmacology target".to_string()),
            Some(TargetRef::Signal(signal)) => {
                if effect.mechanism.is_allosteric() {
                    issue("allosteric modulators must target a receptor, transporter or enzyme".to_string());
                } else if effect.unit != signal.spec().unit {
                    issue(format!(
                        "unit mismatch: declared {}, {} is measured in {}",
                        effect.unit,
                        signal,
                        signal.spec().unit
                    ));
                }
            }
            Some(TargetRef::Entry(i)) => {
                if !effect.unit.is_dimensionless() {
                    issue(format!("unit mismatch: {} effects must be fold or index, declared {}", effect.target, effect.unit));
                }
                let is_pool = TargetRegistry::entry(i).map_or(false, |e| matches!(e.kind, TargetKind::Pool { .. }));
                if is_pool && effect.mechanism.is_allosteric() {
                    issue("allosteric modulators cannot act on auxiliary pools".to_string());
                }
            }
        }
    }
    issues
}

fn check_fraction(name: &str, value: f64, out: &mut Vec<String>) {
    if !(value > 0.0 && value <= 1.0) {
        out.push(format!("{} must be in (0, 1], got {}", name, value));
    }
}

fn check_positive(name: &str, value: f64, out: &mut Vec<String>) {
    if !(value > 0.0 && value.is_finite()) {
        out.push(format!("{} must be positive, got {}", name, value));
    }
}

fn check_volume(name: &str, volume: &VolumeOfDistribution, out: &mut Vec<String>) {
    check_positive(name, volume.raw_value(), out);
    if let VolumeOfDistribution::TotalBodyWaterFraction(f) = volume {
        if *f > 1.5 {
            out.push(format!("{} as a body-water fraction looks implausible: {}", name, f));
        }
    }
}

fn pk_problems(pk: &PkModel) -> Vec<String> {
    let mut out = Vec::new();
    match pk {
        PkModel::OneCompartment {
            bioavailability,
            half_life_min,
            time_to_peak_min,
            volume,
        } => {
            check_fraction("bioavailability", *bioavailability, &mut out);
            check_positive("half-life", *half_life_min, &mut out);
            check_positive("time-to-peak", *time_to_peak_min, &mut out);
            check_volume("volume", volume, &mut out);
        }
        PkModel::TwoCompartment {
            bioavailability,
            half_life_min,
            time_to_peak_min,
            central_volume,
            peripheral_volume,
            intercompartmental_clearance_l_per_min,
        } => {
            check_fraction("bioavailability", *bioavailability, &mut out);
            check_positive("half-life", *half_life_min, &mut out);
            check_positive("time-to-peak", *time_to_peak_min, &mut out);
            check_volume("central volume", central_volume, &mut out);
            check_volume("peripheral volume", peripheral_volume, &mut out);
            check_positive("intercompartmental clearance", *intercompartmental_clearance_l_per_min, &mut out);
        }
        PkModel::MichaelisMenten {
            bioavailability,
            time_to_peak_min,
            vmax_mg_per_l_per_min,
            km_mg_per_l,
            volume,
        } => {
            check_fraction("bioavailability", *bioavailability, &mut out);
            check_positive("time-to-peak", *time_to_peak_min, &mut out);
            check_positive("Vmax", *vmax_mg_per_l_per_min, &mut out);
            check_positive("Km", *km_mg_per_l, &mut out);
            check_volume("volume", volume, &mut out);
        }
        PkModel::ActivityDependent {
            rise_tau_min,
            decay_tau_min,
        } => {
            check_positive("rise tau", *rise_tau_min, &mut out);
            check_positive("decay tau", *decay_tau_min, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pharmacology::{Mechanism, PdEffect};
    use crate::signals::Unit;

    fn activity(pd: Vec<PdEffect>) -> Pharmacology {
        Pharmacology::activity(5.0, 10.0, pd)
    }

    #[test]
    fn test_builtin_library_is_clean() {
        let issues = validate_library(&InterventionLibrary::builtin());
        assert!(issues.is_empty(), "built-in library has issues: {:?}", issues);
    }

    #[test]
    fn test_unknown_target() {
        let p = activity(vec![PdEffect::new("serotonin_2c", Mechanism::Agonist, 0.2, Unit::Fold)]);
        let issues = validate_pharmacology("x", &p);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target_index, Some(0));
        assert_eq!(issues[0].target, "serotonin_2c");
    }

    #[test]
    fn test_unit_mismatch_on_signal() {
        let p = activity(vec![
            PdEffect::new("cortisol", Mechanism::Agonist, 3.0, Unit::Nanomolar),
            PdEffect::new("cortisol", Mechanism::Agonist, 3.0, Unit::MicrogramsPerDl),
        ]);
        let issues = validate_pharmacology("stress", &p);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target_index, Some(0));
        assert!(issues[0].message.contains("unit mismatch"));
    }

    #[test]
    fn test_modulator_rules() {
        let p = activity(vec![
            PdEffect::new("GABA_A", Mechanism::PositiveAllosteric, 0.5, Unit::Nanomolar),
            PdEffect::new("gaba", Mechanism::PositiveAllosteric, 0.5, Unit::Nanomolar),
            PdEffect::new("tyrosine_pool", Mechanism::NegativeAllosteric, 0.5, Unit::Index),
        ]);
        let issues = validate_pharmacology("mod", &p);
        let indices: Vec<Option<usize>> = issues.iter().map(|i| i.target_index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_pk_problems() {
        let p = Pharmacology {
            molecule: None,
            dose_mg: 10.0,
            pk: PkModel::OneCompartment {
                bioavailability: 1.5,
                half_life_min: 0.0,
                time_to_peak_min: 30.0,
                volume: VolumeOfDistribution::LitersPerKg(1.0),
            },
            pd: vec![PdEffect::new("DAT", Mechanism::Antagonist, 0.5, Unit::Fold).with_potency(100.0)],
        };
        let issues = validate_pharmacology("bad", &p);
        assert!(issues.iter().all(|i| i.target_index.is_none()));
        // bioavailability, half-life, missing molecule
        assert_eq!(issues.len(), 3, "{:?}", issues);
    }
}
