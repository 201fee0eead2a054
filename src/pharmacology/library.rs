//! Built-in intervention definitions.
//!
//! Each definition declares a parameter schema and a pure factory turning
//! resolved parameters into `Pharmacology`. Factories run when a request is
//! built, never inside the integration loop.
//!
//! PK constants (half-life, tmax, Vd, F) and affinities:
//! - Caffeine: Fredholm BB et al. Pharmacol Rev. 1999;51:83-133
//! - Ethanol: Holford NHG. Clin Pharmacokinet. 1987;13:273-292
//! - Methylphenidate: Volkow ND et al. Am J Psychiatry. 1998;155:1325-1331
//! - Sertraline: DeVane CL et al. Clin Pharmacokinet. 2002;41:1247-1266
//! - Alprazolam: Greenblatt DJ, Wright CE. Clin Pharmacokinet. 1993;24:453-471
//! - Melatonin: Harpsoe NG et al. Eur J Clin Pharmacol. 2015;71:901-909

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::pk::{PkModel, VolumeOfDistribution};
use super::{Mechanism, Molecule, PdEffect, Pharmacology};
use crate::signals::Unit;

/// Key of the intervention that marks the subject as asleep
pub const SLEEP_KEY: &str = "sleep";

/// One declared parameter of a definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

const fn param(key: &'static str, label: &'static str, unit: &'static str, default: f64, min: f64, max: f64) -> ParamSpec {
    ParamSpec {
        key,
        label,
        unit,
        default,
        min,
        max,
    }
}

/// Parameters after defaults and range clamping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParams(BTreeMap<String, f64>);

impl ResolvedParams {
    /// Value of a declared parameter (0 for undeclared keys)
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Template of an intervention
#[derive(Clone)]
pub struct InterventionDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub params: &'static [ParamSpec],
    pub default_duration_min: f64,
    pub factory: fn(&ResolvedParams) -> Pharmacology,
}

impl fmt::Debug for InterventionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterventionDefinition")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("params", &self.params)
            .field("default_duration_min", &self.default_duration_min)
            .finish_non_exhaustive()
    }
}

impl InterventionDefinition {
    /// Fill missing parameters with defaults and clamp to declared ranges
    ///
    /// Unknown keys are dropped with a debug log; non-finite values fall
    /// back to the default.
    pub fn resolve_params(&self, given: &BTreeMap<String, f64>) -> ResolvedParams {
        for key in given.keys() {
            if !self.params.iter().any(|p| p.key == key.as_str()) {
                log::debug!("Ignoring unknown parameter '{}' for '{}'", key, self.key);
            }
        }
        let values = self
            .params
            .iter()
            .map(|spec| {
                let value = given
                    .get(spec.key)
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(spec.default)
                    .clamp(spec.min, spec.max);
                (spec.key.to_string(), value)
            })
            .collect();
        ResolvedParams(values)
    }

    /// Run the factory on resolved parameters
    pub fn pharmacology(&self, given: &BTreeMap<String, f64>) -> Pharmacology {
        (self.factory)(&self.resolve_params(given))
    }

    /// Pharmacology at default parameters
    pub fn default_pharmacology(&self) -> Pharmacology {
        self.pharmacology(&BTreeMap::new())
    }
}

/// Collection of intervention definitions, looked up by key
#[derive(Debug, Clone, Default)]
pub struct InterventionLibrary {
    definitions: Vec<InterventionDefinition>,
}

impl InterventionLibrary {
    pub fn new(definitions: Vec<InterventionDefinition>) -> Self {
        Self { definitions }
    }

    /// Library with every built-in definition
    pub fn builtin() -> Self {
        Self::new(vec![
            InterventionDefinition {
                key: "caffeine",
                label: "Caffeine",
                params: DOSE_CAFFEINE,
                default_duration_min: 0.0,
                factory: caffeine,
            },
            InterventionDefinition {
                key: "ethanol",
                label: "Alcohol",
                params: DOSE_ETHANOL,
                default_duration_min: 30.0,
                factory: ethanol,
            },
            InterventionDefinition {
                key: "methylphenidate",
                label: "Methylphenidate",
                params: DOSE_METHYLPHENIDATE,
                default_duration_min: 0.0,
                factory: methylphenidate,
            },
            InterventionDefinition {
                key: "sertraline",
                label: "Sertraline",
                params: DOSE_SERTRALINE,
                default_duration_min: 0.0,
                factory: sertraline,
            },
            InterventionDefinition {
                key: "alprazolam",
                label: "Alprazolam",
                params: DOSE_ALPRAZOLAM,
                default_duration_min: 0.0,
                factory: alprazolam,
            },
            InterventionDefinition {
                key: "melatonin",
                label: "Melatonin supplement",
                params: DOSE_MELATONIN,
                default_duration_min: 0.0,
                factory: melatonin,
            },
            InterventionDefinition {
                key: "l_tyrosine",
                label: "L-Tyrosine",
                params: DOSE_TYROSINE,
                default_duration_min: 0.0,
                factory: l_tyrosine,
            },
            InterventionDefinition {
                key: "meal",
                label: "Meal",
                params: MEAL,
                default_duration_min: 30.0,
                factory: meal,
            },
            InterventionDefinition {
                key: "exercise",
                label: "Exercise",
                params: EXERCISE,
                default_duration_min: 45.0,
                factory: exercise,
            },
            InterventionDefinition {
                key: "light",
                label: "Bright light",
                params: LIGHT,
                default_duration_min: 30.0,
                factory: light,
            },
            InterventionDefinition {
                key: "breathwork",
                label: "Slow breathing",
                params: &[],
                default_duration_min: 15.0,
                factory: breathwork,
            },
            InterventionDefinition {
                key: SLEEP_KEY,
                label: "Sleep",
                params: &[],
                default_duration_min: 480.0,
                factory: sleep,
            },
        ])
    }

    pub fn get(&self, key: &str) -> Option<&InterventionDefinition> {
        self.definitions.iter().find(|d| d.key == key)
    }

    pub fn definitions(&self) -> &[InterventionDefinition] {
        &self.definitions
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.key).collect()
    }

    /// Resolve a key and raw parameters into pharmacology
    pub fn resolve(&self, key: &str, params: &BTreeMap<String, f64>) -> Option<Pharmacology> {
        self.get(key).map(|d| d.pharmacology(params))
    }

    /// Add or replace a definition
    pub fn register(&mut self, definition: InterventionDefinition) {
        match self.definitions.iter_mut().find(|d| d.key == definition.key) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }
}

// ============================================================================
// Parameter schemas
// ============================================================================

static DOSE_CAFFEINE: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 100.0, 0.0, 1000.0)];
static DOSE_ETHANOL: &[ParamSpec] = &[param("standard_drinks", "Drinks", "14 g", 1.0, 0.0, 10.0)];
static DOSE_METHYLPHENIDATE: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 10.0, 0.0, 80.0)];
static DOSE_SERTRALINE: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 50.0, 0.0, 200.0)];
static DOSE_ALPRAZOLAM: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 0.5, 0.0, 4.0)];
static DOSE_MELATONIN: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 3.0, 0.0, 20.0)];
static DOSE_TYROSINE: &[ParamSpec] = &[param("dose_mg", "Dose", "mg", 1000.0, 0.0, 5000.0)];
static MEAL: &[ParamSpec] = &[
    param("carbs_g", "Carbohydrate", "g", 60.0, 0.0, 300.0),
    param("protein_g", "Protein", "g", 25.0, 0.0, 150.0),
];
static EXERCISE: &[ParamSpec] = &[param("intensity", "Intensity", "fraction of max", 0.6, 0.0, 1.0)];
static LIGHT: &[ParamSpec] = &[param("lux", "Illuminance", "lux", 1000.0, 0.0, 10000.0)];

// ============================================================================
// Factories
// ============================================================================

fn caffeine(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("caffeine", 194.19),
        p.get("dose_mg"),
        PkModel::OneCompartment {
            bioavailability: 0.99,
            half_life_min: 300.0,
            time_to_peak_min: 45.0,
            volume: VolumeOfDistribution::LitersPerKg(0.6),
        },
        vec![
            // Fredholm 1999: Ki ~12 uM (A1), ~2.4 uM (A2A)
            PdEffect::new("A1", Mechanism::Antagonist, 0.6, Unit::Fold).with_potency(12_000.0),
            PdEffect::new("A2A", Mechanism::Antagonist, 0.6, Unit::Fold).with_potency(2_400.0),
        ],
    )
}

fn ethanol(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("ethanol", 46.07),
        14_000.0 * p.get("standard_drinks"),
        PkModel::MichaelisMenten {
            bioavailability: 0.8,
            time_to_peak_min: 45.0,
            vmax_mg_per_l_per_min: 2.5,
            km_mg_per_l: 100.0,
            volume: VolumeOfDistribution::TotalBodyWaterFraction(1.0),
        },
        vec![
            // Low-millimolar effects at extrasynaptic GABA-A and NMDA
            PdEffect::new("GABA_A", Mechanism::PositiveAllosteric, 0.5, Unit::Fold).with_potency(1.0e7),
            PdEffect::new("NMDA", Mechanism::Antagonist, 0.4, Unit::Fold).with_potency(2.0e7),
            PdEffect::new("mu_opioid", Mechanism::Agonist, 0.2, Unit::Fold).with_potency(2.0e7),
        ],
    )
}

fn methylphenidate(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("methylphenidate", 233.31),
        p.get("dose_mg"),
        PkModel::OneCompartment {
            bioavailability: 0.3,
            half_life_min: 180.0,
            time_to_peak_min: 120.0,
            volume: VolumeOfDistribution::LitersPerKg(2.0),
        },
        vec![
            PdEffect::new("DAT", Mechanism::Antagonist, 0.7, Unit::Fold).with_potency(100.0),
            PdEffect::new("NET", Mechanism::Antagonist, 0.5, Unit::Fold).with_potency(300.0),
        ],
    )
}

fn sertraline(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("sertraline", 306.23),
        p.get("dose_mg"),
        PkModel::TwoCompartment {
            bioavailability: 0.44,
            half_life_min: 1560.0,
            time_to_peak_min: 360.0,
            central_volume: VolumeOfDistribution::LitersPerKg(5.0),
            peripheral_volume: VolumeOfDistribution::LitersPerKg(15.0),
            intercompartmental_clearance_l_per_min: 0.5,
        },
        vec![
            PdEffect::new("SERT", Mechanism::Antagonist, 0.8, Unit::Fold).with_potency(1.0),
            PdEffect::new("DAT", Mechanism::Antagonist, 0.1, Unit::Fold).with_potency(25.0),
        ],
    )
}

fn alprazolam(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("alprazolam", 308.77),
        p.get("dose_mg"),
        PkModel::OneCompartment {
            bioavailability: 0.9,
            half_life_min: 660.0,
            time_to_peak_min: 90.0,
            volume: VolumeOfDistribution::LitersPerKg(0.8),
        },
        vec![PdEffect::new("GABA_A", Mechanism::PositiveAllosteric, 0.8, Unit::Fold).with_potency(20.0)],
    )
}

fn melatonin(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("melatonin", 232.28),
        p.get("dose_mg"),
        PkModel::OneCompartment {
            bioavailability: 0.15,
            half_life_min: 45.0,
            time_to_peak_min: 50.0,
            volume: VolumeOfDistribution::LitersPerKg(1.0),
        },
        vec![
            PdEffect::new("melatonin", Mechanism::Agonist, 150.0, Unit::PicogramsPerMl).with_tau(15.0),
            PdEffect::new("MT1", Mechanism::Agonist, 0.4, Unit::Fold).with_potency(1.0),
        ],
    )
}

fn l_tyrosine(p: &ResolvedParams) -> Pharmacology {
    Pharmacology::substance(
        Molecule::new("tyrosine", 181.19),
        p.get("dose_mg"),
        PkModel::OneCompartment {
            bioavailability: 0.9,
            half_life_min: 150.0,
            time_to_peak_min: 120.0,
            volume: VolumeOfDistribution::LitersPerKgLeanMass(0.8),
        },
        vec![PdEffect::new("tyrosine_pool", Mechanism::Agonist, 0.004, Unit::Index)],
    )
}

fn meal(p: &ResolvedParams) -> Pharmacology {
    let carbs = p.get("carbs_g");
    let protein = p.get("protein_g");
    Pharmacology::activity(
        20.0,
        60.0,
        vec![
            PdEffect::new("glucose", Mechanism::Agonist, 0.6 * carbs, Unit::MilligramsPerDl).with_tau(30.0),
            PdEffect::new("ghrelin", Mechanism::Antagonist, 300.0, Unit::PicogramsPerMl),
            PdEffect::new("tryptophan_pool", Mechanism::Agonist, 0.00004 * protein, Unit::Index),
            PdEffect::new("tyrosine_pool", Mechanism::Agonist, 0.00004 * protein, Unit::Index),
        ],
    )
}

fn exercise(p: &ResolvedParams) -> Pharmacology {
    let i = p.get("intensity");
    Pharmacology::activity(
        5.0,
        30.0,
        vec![
            PdEffect::new("norepinephrine", Mechanism::Agonist, 600.0 * i, Unit::PicogramsPerMl),
            PdEffect::new("adrenaline", Mechanism::Agonist, 200.0 * i, Unit::PicogramsPerMl),
            PdEffect::new("cortisol", Mechanism::Agonist, 6.0 * i, Unit::MicrogramsPerDl),
            PdEffect::new("dopamine", Mechanism::Agonist, 15.0 * i, Unit::Nanomolar),
            PdEffect::new("glucose", Mechanism::Antagonist, 15.0 * i, Unit::MilligramsPerDl),
            PdEffect::new("glucagon", Mechanism::Agonist, 40.0 * i, Unit::PicogramsPerMl),
        ],
    )
}

fn light(p: &ResolvedParams) -> Pharmacology {
    // Log-linear response, saturating around 10,000 lux
    let drive = ((p.get("lux") + 1.0).log10() / 4.0).clamp(0.0, 1.0);
    Pharmacology::activity(
        2.0,
        15.0,
        vec![
            PdEffect::new("melatonin", Mechanism::Antagonist, 60.0 * drive, Unit::PicogramsPerMl).with_tau(10.0),
            PdEffect::new("orexin", Mechanism::Agonist, 80.0 * drive, Unit::PicogramsPerMl),
            PdEffect::new("serotonin", Mechanism::Agonist, 8.0 * drive, Unit::Nanomolar),
            PdEffect::new("cortisol", Mechanism::Agonist, 2.0 * drive, Unit::MicrogramsPerDl),
        ],
    )
}

fn breathwork(_: &ResolvedParams) -> Pharmacology {
    Pharmacology::activity(
        3.0,
        20.0,
        vec![
            PdEffect::new("norepinephrine", Mechanism::Antagonist, 80.0, Unit::PicogramsPerMl),
            PdEffect::new("cortisol", Mechanism::Antagonist, 1.5, Unit::MicrogramsPerDl),
            PdEffect::new("GABA_A", Mechanism::Agonist, 0.2, Unit::Fold),
        ],
    )
}

fn sleep(_: &ResolvedParams) -> Pharmacology {
    Pharmacology::activity(
        10.0,
        30.0,
        vec![
            // Porkka-Heiskanen 1997: adenosine is cleared during sleep
            PdEffect::new("adenosine", Mechanism::Antagonist, 60.0, Unit::Nanomolar),
            PdEffect::new("norepinephrine", Mechanism::Antagonist, 100.0, Unit::PicogramsPerMl),
            PdEffect::new("gaba", Mechanism::Agonist, 100.0, Unit::Nanomolar),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_unique() {
        let lib = InterventionLibrary::builtin();
        let keys = lib.keys();
        for (i, a) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(a), "duplicate key {}", a);
        }
        assert!(lib.get(SLEEP_KEY).is_some());
    }

    #[test]
    fn test_params_default_and_clamp() {
        let lib = InterventionLibrary::builtin();
        let def = lib.get("caffeine").unwrap();
        let mut given = BTreeMap::new();
        assert_eq!(def.resolve_params(&given).get("dose_mg"), 100.0);
        given.insert("dose_mg".to_string(), 5000.0);
        assert_eq!(def.resolve_params(&given).get("dose_mg"), 1000.0);
        given.insert("dose_mg".to_string(), f64::NAN);
        assert_eq!(def.resolve_params(&given).get("dose_mg"), 100.0);
    }

    #[test]
    fn test_factory_uses_params() {
        let lib = InterventionLibrary::builtin();
        let mut given = BTreeMap::new();
        given.insert("dose_mg".to_string(), 200.0);
        let p = lib.resolve("caffeine", &given).unwrap();
        assert_eq!(p.dose_mg, 200.0);
        assert_eq!(p.pd.len(), 2);
        assert!(lib.resolve("unknown", &given).is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut lib = InterventionLibrary::builtin();
        let count = lib.definitions().len();
        let mut replacement = lib.get("light").unwrap().clone();
        replacement.label = "Sunlight";
        lib.register(replacement);
        assert_eq!(lib.definitions().len(), count);
        assert_eq!(lib.get("light").unwrap().label, "Sunlight");
    }
}
