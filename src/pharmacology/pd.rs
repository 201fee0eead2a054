//! Pharmacodynamics: from concentration to target occupancy.
//!
//! With a declared potency the occupancy follows the Hill equation on the
//! molar concentration. Without one it is the concentration normalised by the
//! instance's nominal peak, so the effect scales with exposure and reaches
//! its full magnitude at the nominal peak.

use super::kinetics::hill_occupancy;
use super::{Molecule, PdEffect};

/// Fraction of the target engaged by one effect, in [0, 1]
///
/// # Arguments
/// * `effect` - The PD effect
/// * `level` - Central concentration in mg/L, or engagement for activities
/// * `molecule` - Substance, used to convert mg/L to nM
/// * `reference_level` - Nominal peak of the instance (1.0 for activities)
pub fn occupancy(effect: &PdEffect, level: f64, molecule: Option<&Molecule>, reference_level: f64) -> f64 {
    if !level.is_finite() || level <= 0.0 {
        return 0.0;
    }
    let occ = match effect.potency_nm {
        Some(k) => {
            let c = match molecule {
                Some(m) => m.to_nanomolar(level),
                None => level,
            };
            hill_occupancy(c, k, effect.hill.unwrap_or(1.0))
        }
        None => {
            if reference_level > 0.0 {
                level / reference_level
            } else {
                0.0
            }
        }
    };
    if occ.is_finite() {
        occ.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pharmacology::Mechanism;
    use crate::signals::Unit;

    #[test]
    fn test_potency_in_nanomolar() {
        let effect = PdEffect::new("A1", Mechanism::Antagonist, 0.6, Unit::Fold).with_potency(10_000.0);
        let molecule = Molecule::new("x", 100.0);
        // 1 mg/L = 10 uM = K -> half occupancy
        let occ = occupancy(&effect, 1.0, Some(&molecule), 5.0);
        assert!((occ - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_potency_normalises_by_reference() {
        let effect = PdEffect::new("glucose", Mechanism::Agonist, 30.0, Unit::MilligramsPerDl);
        assert!((occupancy(&effect, 0.25, None, 1.0) - 0.25).abs() < 1e-12);
        assert_eq!(occupancy(&effect, 3.0, None, 1.0), 1.0);
        assert_eq!(occupancy(&effect, 0.5, None, 0.0), 0.0);
    }

    #[test]
    fn test_non_finite_level() {
        let effect = PdEffect::new("glucose", Mechanism::Agonist, 30.0, Unit::MilligramsPerDl);
        assert_eq!(occupancy(&effect, f64::NAN, None, 1.0), 0.0);
        assert_eq!(occupancy(&effect, f64::INFINITY, None, 1.0), 0.0);
    }
}
