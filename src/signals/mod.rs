//! Signal catalog for the physiology simulation.
//!
//! The set of simulated quantities is closed at build time:
//! - 16 displayed signals (neurotransmitters, hormones, metabolic markers)
//! - 5 auxiliary pools (vesicle reserves and amino-acid precursor pools)
//!
//! Every signal carries its canonical unit, physiological bounds, a reference
//! level (24h mean) and a relaxation time constant. Reference levels are
//! order-of-magnitude values from the literature, used for normalisation.
//!
//! References:
//! - Czeisler CA, Klerman EB. Recent Prog Horm Res. 1999;54:97-130 (cortisol, melatonin)
//! - Grace AA. Nat Rev Neurosci. 2016;17:524-532 (tonic dopamine)
//! - Porkka-Heiskanen T et al. Science. 1997;276:1265-1268 (adenosine)

mod pool;

pub use pool::{AuxValues, SignalValues};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical measurement units.
///
/// PD effects declare one of these; direct signal effects must match the
/// signal's unit, modulators and registry-routed effects must be dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "nM")]
    Nanomolar,
    #[serde(rename = "uM")]
    Micromolar,
    #[serde(rename = "pg/mL")]
    PicogramsPerMl,
    #[serde(rename = "ug/dL")]
    MicrogramsPerDl,
    #[serde(rename = "mg/dL")]
    MilligramsPerDl,
    #[serde(rename = "uIU/mL")]
    MicroUnitsPerMl,
    /// Fold change relative to a reference level
    #[serde(rename = "fold")]
    Fold,
    /// Dimensionless index (fraction, activity, engagement)
    #[serde(rename = "index")]
    Index,
}

impl Unit {
    /// Fold changes and indices carry no physical dimension
    pub fn is_dimensionless(&self) -> bool {
        matches!(self, Unit::Fold | Unit::Index)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Nanomolar => "nM",
            Unit::Micromolar => "uM",
            Unit::PicogramsPerMl => "pg/mL",
            Unit::MicrogramsPerDl => "ug/dL",
            Unit::MilligramsPerDl => "mg/dL",
            Unit::MicroUnitsPerMl => "uIU/mL",
            Unit::Fold => "fold",
            Unit::Index => "index",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Displayed physiological signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Dopamine,
    Serotonin,
    Norepinephrine,
    Adrenaline,
    Gaba,
    Glutamate,
    Acetylcholine,
    Histamine,
    Orexin,
    Melatonin,
    Cortisol,
    Adenosine,
    Glucose,
    Insulin,
    Glucagon,
    Ghrelin,
}

/// Static description of a signal
#[derive(Debug, Clone, Copy)]
pub struct SignalSpec {
    /// Human-readable name
    pub name: &'static str,
    /// Canonical unit
    pub unit: Unit,
    /// Lower physiological bound
    pub min: f64,
    /// Upper physiological bound
    pub max: f64,
    /// 24h mean level, used to normalise couplings and fold changes
    pub reference: f64,
    /// Relaxation time constant toward the circadian setpoint (minutes)
    pub tau_min: f64,
}

impl Signal {
    /// Number of signals
    pub const COUNT: usize = 16;

    /// All signals in index order
    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::Dopamine,
        Signal::Serotonin,
        Signal::Norepinephrine,
        Signal::Adrenaline,
        Signal::Gaba,
        Signal::Glutamate,
        Signal::Acetylcholine,
        Signal::Histamine,
        Signal::Orexin,
        Signal::Melatonin,
        Signal::Cortisol,
        Signal::Adenosine,
        Signal::Glucose,
        Signal::Insulin,
        Signal::Glucagon,
        Signal::Ghrelin,
    ];

    /// Position in value arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable snake_case key
    pub fn key(self) -> &'static str {
        match self {
            Signal::Dopamine => "dopamine",
            Signal::Serotonin => "serotonin",
            Signal::Norepinephrine => "norepinephrine",
            Signal::Adrenaline => "adrenaline",
            Signal::Gaba => "gaba",
            Signal::Glutamate => "glutamate",
            Signal::Acetylcholine => "acetylcholine",
            Signal::Histamine => "histamine",
            Signal::Orexin => "orexin",
            Signal::Melatonin => "melatonin",
            Signal::Cortisol => "cortisol",
            Signal::Adenosine => "adenosine",
            Signal::Glucose => "glucose",
            Signal::Insulin => "insulin",
            Signal::Glucagon => "glucagon",
            Signal::Ghrelin => "ghrelin",
        }
    }

    /// Look up a signal by its key
    pub fn from_key(key: &str) -> Option<Signal> {
        Signal::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// Static description
    pub fn spec(self) -> SignalSpec {
        let (name, unit, min, max, reference, tau_min) = match self {
            // Grace 2016: tonic striatal dopamine in the tens of nM
            Signal::Dopamine => ("Dopamine", Unit::Nanomolar, 0.0, 400.0, 50.0, 30.0),
            Signal::Serotonin => ("Serotonin", Unit::Nanomolar, 0.0, 300.0, 40.0, 45.0),
            Signal::Norepinephrine => ("Norepinephrine", Unit::PicogramsPerMl, 0.0, 2000.0, 300.0, 20.0),
            Signal::Adrenaline => ("Adrenaline", Unit::PicogramsPerMl, 0.0, 1000.0, 50.0, 10.0),
            Signal::Gaba => ("GABA", Unit::Nanomolar, 0.0, 2000.0, 600.0, 20.0),
            Signal::Glutamate => ("Glutamate", Unit::Micromolar, 0.0, 50.0, 10.0, 15.0),
            Signal::Acetylcholine => ("Acetylcholine", Unit::Nanomolar, 0.0, 200.0, 40.0, 15.0),
            Signal::Histamine => ("Histamine", Unit::Nanomolar, 0.0, 100.0, 15.0, 30.0),
            Signal::Orexin => ("Orexin-A", Unit::PicogramsPerMl, 0.0, 1000.0, 250.0, 40.0),
            // Czeisler & Klerman 1999: daytime <10 pg/mL, nocturnal peak 60-80 pg/mL
            Signal::Melatonin => ("Melatonin", Unit::PicogramsPerMl, 0.0, 300.0, 20.0, 30.0),
            Signal::Cortisol => ("Cortisol", Unit::MicrogramsPerDl, 0.0, 50.0, 10.0, 60.0),
            // Porkka-Heiskanen 1997: basal forebrain adenosine rises with wakefulness
            Signal::Adenosine => ("Adenosine", Unit::Nanomolar, 0.0, 1000.0, 200.0, 60.0),
            Signal::Glucose => ("Glucose", Unit::MilligramsPerDl, 40.0, 400.0, 90.0, 45.0),
            Signal::Insulin => ("Insulin", Unit::MicroUnitsPerMl, 0.0, 300.0, 8.0, 20.0),
            Signal::Glucagon => ("Glucagon", Unit::PicogramsPerMl, 0.0, 400.0, 70.0, 30.0),
            Signal::Ghrelin => ("Ghrelin", Unit::PicogramsPerMl, 0.0, 2000.0, 600.0, 60.0),
        };
        SignalSpec {
            name,
            unit,
            min,
            max,
            reference,
            tau_min,
        }
    }

    /// Clamp a value to the physiological bounds
    #[inline]
    pub fn clamp(self, value: f64) -> f64 {
        let spec = self.spec();
        value.clamp(spec.min, spec.max)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Internal, non-displayed capacity pools.
///
/// Values are fractions of nominal capacity (nominal = 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxPool {
    DopamineVesicles,
    SerotoninVesicles,
    NorepinephrineVesicles,
    TyrosinePool,
    TryptophanPool,
}

impl AuxPool {
    pub const COUNT: usize = 5;

    pub const ALL: [AuxPool; AuxPool::COUNT] = [
        AuxPool::DopamineVesicles,
        AuxPool::SerotoninVesicles,
        AuxPool::NorepinephrineVesicles,
        AuxPool::TyrosinePool,
        AuxPool::TryptophanPool,
    ];

    /// Upper bound of any pool (fraction of nominal)
    pub const MAX_FRACTION: f64 = 2.0;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            AuxPool::DopamineVesicles => "dopamine_vesicles",
            AuxPool::SerotoninVesicles => "serotonin_vesicles",
            AuxPool::NorepinephrineVesicles => "norepinephrine_vesicles",
            AuxPool::TyrosinePool => "tyrosine_pool",
            AuxPool::TryptophanPool => "tryptophan_pool",
        }
    }

    pub fn from_key(key: &str) -> Option<AuxPool> {
        AuxPool::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Refill/relaxation time constant (minutes)
    ///
    /// Vesicular monoamine stores refill over hours after depletion
    /// (Sulzer D et al. Prog Neurobiol. 2005;75:406-433).
    pub fn tau_min(self) -> f64 {
        match self {
            AuxPool::DopamineVesicles => 180.0,
            AuxPool::SerotoninVesicles => 240.0,
            AuxPool::NorepinephrineVesicles => 180.0,
            AuxPool::TyrosinePool => 240.0,
            AuxPool::TryptophanPool => 240.0,
        }
    }

    /// Signal released from this vesicle pool, if any
    pub fn released_signal(self) -> Option<Signal> {
        match self {
            AuxPool::DopamineVesicles => Some(Signal::Dopamine),
            AuxPool::SerotoninVesicles => Some(Signal::Serotonin),
            AuxPool::NorepinephrineVesicles => Some(Signal::Norepinephrine),
            _ => None,
        }
    }

    /// Precursor pool feeding this vesicle pool, if any
    pub fn precursor(self) -> Option<AuxPool> {
        match self {
            AuxPool::DopamineVesicles | AuxPool::NorepinephrineVesicles => Some(AuxPool::TyrosinePool),
            AuxPool::SerotoninVesicles => Some(AuxPool::TryptophanPool),
            _ => None,
        }
    }

    /// Vesicle pool that limits release of a signal
    pub fn vesicles_for(signal: Signal) -> Option<AuxPool> {
        AuxPool::ALL
            .iter()
            .copied()
            .find(|p| p.released_signal() == Some(signal))
    }
}

impl fmt::Display for AuxPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_indices_match_order() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.index(), i);
        }
        for (i, pool) in AuxPool::ALL.iter().enumerate() {
            assert_eq!(pool.index(), i);
        }
    }

    #[test]
    fn test_key_roundtrip() {
        for signal in Signal::ALL {
            assert_eq!(Signal::from_key(signal.key()), Some(signal));
        }
        assert_eq!(Signal::from_key("dat"), None);
    }

    #[test]
    fn test_reference_within_bounds() {
        for signal in Signal::ALL {
            let spec = signal.spec();
            assert!(spec.reference >= spec.min && spec.reference <= spec.max, "{}", signal);
            assert!(spec.tau_min > 0.0);
        }
    }

    #[test]
    fn test_serde_keys() {
        let json = serde_json::to_string(&Signal::Norepinephrine).unwrap();
        assert_eq!(json, "\"norepinephrine\"");
        let unit: Unit = serde_json::from_str("\"pg/mL\"").unwrap();
        assert_eq!(unit, Unit::PicogramsPerMl);
    }

    #[test]
    fn test_vesicle_lookup() {
        assert_eq!(AuxPool::vesicles_for(Signal::Dopamine), Some(AuxPool::DopamineVesicles));
        assert_eq!(AuxPool::vesicles_for(Signal::Cortisol), None);
        assert_eq!(AuxPool::SerotoninVesicles.precursor(), Some(AuxPool::TryptophanPool));
    }
}
