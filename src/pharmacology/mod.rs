//! Pharmacology resolver.
//!
//! An intervention is described by plain data: a molecule, a dose, a PK model
//! and a list of PD effects. Definitions in the library turn user parameters
//! into that data through a pure factory; the integrator only ever sees the
//! resolved values.
//!
//! - `kinetics`: saturable rate laws shared by PK and PD
//! - `pk`: PK model variants and their resolution against the subject
//! - `pd`: occupancy and mechanism signs
//! - `library`: built-in intervention definitions
//! - `validation`: ahead-of-time checks over definitions

pub mod kinetics;
pub mod library;
pub mod pd;
pub mod pk;
pub mod validation;

pub use library::{InterventionDefinition, InterventionLibrary, ParamSpec, ResolvedParams, SLEEP_KEY};
pub use pd::occupancy;
pub use pk::{resolve_pk, PkModel, PkParameters, VolumeOfDistribution};
pub use validation::{validate_library, validate_pharmacology, ValidationIssue};

use serde::{Deserialize, Serialize};

use crate::signals::Unit;

/// How an effect engages its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Agonist,
    Antagonist,
    PositiveAllosteric,
    NegativeAllosteric,
}

impl Mechanism {
    /// +1 for activating mechanisms, -1 for inhibiting ones
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Mechanism::Agonist | Mechanism::PositiveAllosteric => 1.0,
            Mechanism::Antagonist | Mechanism::NegativeAllosteric => -1.0,
        }
    }

    /// Modulators scale existing activity instead of adding a term
    #[inline]
    pub fn is_allosteric(self) -> bool {
        matches!(self, Mechanism::PositiveAllosteric | Mechanism::NegativeAllosteric)
    }
}

/// One PD effect of an intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdEffect {
    /// Signal key or target registry key
    pub target: String,
    pub mechanism: Mechanism,
    /// Intrinsic efficacy at full occupancy, in `unit`
    pub magnitude: f64,
    /// Ki / EC50 in nM; `None` scales by normalised concentration
    #[serde(default)]
    pub potency_nm: Option<f64>,
    /// Hill coefficient (1.0 if absent)
    #[serde(default)]
    pub hill: Option<f64>,
    /// Time constant applying direct signal effects (signal tau if absent)
    #[serde(default)]
    pub tau_min: Option<f64>,
    /// Declared unit of `magnitude`
    pub unit: Unit,
}

impl PdEffect {
    pub fn new(target: &str, mechanism: Mechanism, magnitude: f64, unit: Unit) -> Self {
        Self {
            target: target.to_string(),
            mechanism,
            magnitude,
            potency_nm: None,
            hill: None,
            tau_min: None,
            unit,
        }
    }

    pub fn with_potency(mut self, potency_nm: f64) -> Self {
        self.potency_nm = Some(potency_nm);
        self
    }

    pub fn with_hill(mut self, hill: f64) -> Self {
        self.hill = Some(hill);
        self
    }

    pub fn with_tau(mut self, tau_min: f64) -> Self {
        self.tau_min = Some(tau_min);
        self
    }
}

/// Physical substance behind a drug or nutrient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub name: String,
    /// Needed to convert mg/L into nM for potency comparisons
    pub molar_mass_g_per_mol: f64,
}

impl Molecule {
    pub fn new(name: &str, molar_mass_g_per_mol: f64) -> Self {
        Self {
            name: name.to_string(),
            molar_mass_g_per_mol,
        }
    }

    /// mg/L -> nM
    #[inline]
    pub fn to_nanomolar(&self, mg_per_l: f64) -> f64 {
        if self.molar_mass_g_per_mol <= 0.0 {
            return 0.0;
        }
        mg_per_l / self.molar_mass_g_per_mol * 1.0e6
    }
}

/// Resolved pharmacology of one intervention instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacology {
    #[serde(default)]
    pub molecule: Option<Molecule>,
    /// Administered amount (ignored by activity-dependent models)
    #[serde(default)]
    pub dose_mg: f64,
    pub pk: PkModel,
    pub pd: Vec<PdEffect>,
}

impl Pharmacology {
    /// Behavioural intervention without a substance
    pub fn activity(rise_tau_min: f64, decay_tau_min: f64, pd: Vec<PdEffect>) -> Self {
        Self {
            molecule: None,
            dose_mg: 0.0,
            pk: PkModel::ActivityDependent {
                rise_tau_min,
                decay_tau_min,
            },
            pd,
        }
    }

    /// Drug or nutrient with a physical dose
    pub fn substance(molecule: Molecule, dose_mg: f64, pk: PkModel, pd: Vec<PdEffect>) -> Self {
        Self {
            molecule: Some(molecule),
            dose_mg,
            pk,
            pd,
        }
    }
}
