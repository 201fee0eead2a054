//! Per-mechanism breakdown of the signal derivative.

use crate::signals::{Signal, SignalValues};

/// Signal derivative split by the mechanism that produced it
///
/// Every term is in signal units per minute. The integrated signal
/// derivative is `total()`; a term whose debug flag is off is all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivativeTerms {
    /// Relaxation toward the circadian setpoint
    pub baseline: SignalValues,
    /// Vesicle-limited release
    pub production: SignalValues,
    /// Adapted reuptake without drug engagement
    pub transporters: SignalValues,
    /// Adapted catabolism without drug engagement
    pub enzymes: SignalValues,
    /// Lagged signal-to-signal influence
    pub coupling: SignalValues,
    /// Everything driven by intervention occupancy
    pub interventions: SignalValues,
    /// Receptor-mediated drive without drug engagement
    pub receptors: SignalValues,
    /// Supervisory corrections
    pub homeostasis: SignalValues,
}

impl DerivativeTerms {
    pub const NAMES: [&'static str; 8] = [
        "baseline",
        "production",
        "transporters",
        "enzymes",
        "coupling",
        "interventions",
        "receptors",
        "homeostasis",
    ];

    /// Look up a term by name
    pub fn term(&self, name: &str) -> Option<&SignalValues> {
        match name {
            "baseline" => Some(&self.baseline),
            "production" => Some(&self.production),
            "transporters" => Some(&self.transporters),
            "enzymes" => Some(&self.enzymes),
            "coupling" => Some(&self.coupling),
            "interventions" => Some(&self.interventions),
            "receptors" => Some(&self.receptors),
            "homeostasis" => Some(&self.homeostasis),
            _ => None,
        }
    }

    /// Sum of all terms for one signal
    pub fn signal_total(&self, signal: Signal) -> f64 {
        self.baseline.get(signal)
            + self.production.get(signal)
            + self.transporters.get(signal)
            + self.enzymes.get(signal)
            + self.coupling.get(signal)
            + self.interventions.get(signal)
            + self.receptors.get(signal)
            + self.homeostasis.get(signal)
    }

    /// Integrated signal derivative
    pub fn total(&self) -> SignalValues {
        SignalValues::from_fn(|s| self.signal_total(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_sums_terms() {
        let mut terms = DerivativeTerms::default();
        terms.baseline.set(Signal::Dopamine, 1.0);
        terms.coupling.set(Signal::Dopamine, -0.25);
        terms.interventions.set(Signal::Dopamine, 0.5);
        terms.homeostasis.set(Signal::Cortisol, -0.1);
        let total = terms.total();
        assert!((total.get(Signal::Dopamine) - 1.25).abs() < 1e-12);
        assert!((total.get(Signal::Cortisol) + 0.1).abs() < 1e-12);
        assert_eq!(total.get(Signal::Serotonin), 0.0);
    }

    #[test]
    fn test_every_name_resolves() {
        let terms = DerivativeTerms::default();
        for name in DerivativeTerms::NAMES {
            assert!(terms.term(name).is_some(), "{}", name);
        }
        assert!(terms.term("pharmacology").is_none());
    }
}
