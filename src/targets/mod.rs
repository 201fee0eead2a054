//! Target registry: receptors, transporters, enzymes and auxiliary pools.
//!
//! PD effects name a target by key. A key resolves either to a signal
//! directly (e.g. "glucose") or to an entry of this table. Entries translate
//! target-level engagement into signal-level terms:
//! - Receptor: fans out to coupled signals with a signed gain
//! - Transporter: scales clearance of its primary signal (reuptake)
//! - Enzyme: scales clearance of each substrate (catabolism)
//! - Pool: feeds or drains an auxiliary pool
//!
//! Receptors, transporters and enzymes carry adaptation kinetics (density or
//! activity drifts under sustained occupancy: tolerance and up-regulation).
//!
//! References:
//! - Fredholm BB et al. Pharmacol Rev. 2001;53:527-552 (adenosine receptors)
//! - Torres GE et al. Nat Rev Neurosci. 2003;4:13-25 (monoamine transporters)
//! - Youdim MBH et al. Nat Rev Neurosci. 2006;7:295-309 (MAO-A/B substrates)

use serde::Serialize;
use std::fmt;

use crate::signals::{AuxPool, Signal};

/// Neurochemical system tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSystem {
    Dopaminergic,
    Serotonergic,
    Noradrenergic,
    Gabaergic,
    Glutamatergic,
    Cholinergic,
    Histaminergic,
    Orexinergic,
    Melatonergic,
    Adenosinergic,
    Endocannabinoid,
    Opioid,
    Endocrine,
    Metabolic,
}

/// What kind of target an entry is, with its signal-level wiring
#[derive(Debug, Clone, Copy)]
pub enum TargetKind {
    Receptor {
        /// Coupled signals with signed gain in [-1, 1]
        couplings: &'static [(Signal, f64)],
        /// Tonic endogenous activation (fold units) that modulators act on
        tone: f64,
    },
    Transporter {
        /// Signal cleared by reuptake
        cleared: Signal,
    },
    Enzyme {
        /// Signals catabolised by this enzyme
        substrates: &'static [Signal],
    },
    Pool {
        pool: AuxPool,
    },
}

/// Slow adaptation of receptor density / transporter and enzyme activity
#[derive(Debug, Clone, Copy)]
pub struct AdaptationKinetics {
    /// Recovery time constant toward the setpoint (minutes)
    pub tau_min: f64,
    /// Fractional change per minute per unit of net occupancy
    pub rate_per_min: f64,
}

impl AdaptationKinetics {
    const NONE: AdaptationKinetics = AdaptationKinetics {
        tau_min: 0.0,
        rate_per_min: 0.0,
    };
    // Receptor desensitisation/down-regulation develops over days
    const RECEPTOR: AdaptationKinetics = AdaptationKinetics {
        tau_min: 4320.0,
        rate_per_min: 0.0005,
    };
    const TRANSPORTER: AdaptationKinetics = AdaptationKinetics {
        tau_min: 2880.0,
        rate_per_min: 0.0003,
    };
    const ENZYME: AdaptationKinetics = AdaptationKinetics {
        tau_min: 4320.0,
        rate_per_min: 0.0002,
    };

    pub fn is_adaptive(&self) -> bool {
        self.tau_min > 0.0
    }
}

/// One registry entry
#[derive(Debug, Clone, Copy)]
pub struct TargetEntry {
    pub key: &'static str,
    pub system: TargetSystem,
    pub description: &'static str,
    pub kind: TargetKind,
    pub adaptation: AdaptationKinetics,
}

impl TargetEntry {
    pub fn is_receptor(&self) -> bool {
        matches!(self.kind, TargetKind::Receptor { .. })
    }

    pub fn is_transporter(&self) -> bool {
        matches!(self.kind, TargetKind::Transporter { .. })
    }

    pub fn is_enzyme(&self) -> bool {
        matches!(self.kind, TargetKind::Enzyme { .. })
    }

    /// Does this entry change clearance of `signal`?
    pub fn clears(&self, signal: Signal) -> bool {
        match self.kind {
            TargetKind::Transporter { cleared } => cleared == signal,
            TargetKind::Enzyme { substrates } => substrates.contains(&signal),
            _ => false,
        }
    }
}

const fn receptor(
    key: &'static str,
    system: TargetSystem,
    description: &'static str,
    couplings: &'static [(Signal, f64)],
    tone: f64,
) -> TargetEntry {
    TargetEntry {
        key,
        system,
        description,
        kind: TargetKind::Receptor { couplings, tone },
        adaptation: AdaptationKinetics::RECEPTOR,
    }
}

const fn transporter(key: &'static str, system: TargetSystem, description: &'static str, cleared: Signal) -> TargetEntry {
    TargetEntry {
        key,
        system,
        description,
        kind: TargetKind::Transporter { cleared },
        adaptation: AdaptationKinetics::TRANSPORTER,
    }
}

const fn enzyme(
    key: &'static str,
    system: TargetSystem,
    description: &'static str,
    substrates: &'static [Signal],
) -> TargetEntry {
    TargetEntry {
        key,
        system,
        description,
        kind: TargetKind::Enzyme { substrates },
        adaptation: AdaptationKinetics::ENZYME,
    }
}

const fn pool(key: &'static str, system: TargetSystem, description: &'static str, pool: AuxPool) -> TargetEntry {
    TargetEntry {
        key,
        system,
        description,
        kind: TargetKind::Pool { pool },
        adaptation: AdaptationKinetics::NONE,
    }
}

use self::TargetSystem::*;
use crate::signals::Signal::*;

static TARGETS: &[TargetEntry] = &[
    // === Receptors ===
    receptor("D1", Dopaminergic, "Gs-coupled postsynaptic dopamine receptor", &[(Glutamate, 0.3), (Acetylcholine, 0.2)], 0.3),
    receptor("D2", Dopaminergic, "Gi-coupled dopamine receptor incl. presynaptic autoreceptor", &[(Dopamine, -0.5), (Acetylcholine, -0.3)], 0.3),
    receptor("5HT1A", Serotonergic, "Somatodendritic serotonin autoreceptor", &[(Serotonin, -0.4), (Norepinephrine, -0.2)], 0.3),
    receptor("5HT2A", Serotonergic, "Cortical Gq-coupled serotonin receptor", &[(Glutamate, 0.4), (Dopamine, 0.1)], 0.2),
    // Fredholm 2001: A1 inhibits release of most excitatory transmitters
    receptor("A1", Adenosinergic, "Gi-coupled adenosine receptor, presynaptic brake", &[(Dopamine, -0.4), (Acetylcholine, -0.4), (Norepinephrine, -0.3), (Glutamate, -0.3)], 0.4),
    receptor("A2A", Adenosinergic, "Striatal/VLPO adenosine receptor promoting sleep", &[(Dopamine, -0.3), (Histamine, -0.3), (Orexin, -0.3)], 0.4),
    receptor("GABA_A", Gabaergic, "Ionotropic chloride channel, benzodiazepine site", &[(Glutamate, -0.4), (Norepinephrine, -0.3), (Cortisol, -0.2), (Orexin, -0.2)], 0.5),
    receptor("GABA_B", Gabaergic, "Metabotropic GABA receptor", &[(Glutamate, -0.2), (Dopamine, -0.2)], 0.3),
    receptor("NMDA", Glutamatergic, "Ionotropic glutamate receptor", &[(Glutamate, 0.3), (Dopamine, 0.1)], 0.3),
    receptor("alpha2A", Noradrenergic, "Presynaptic adrenergic autoreceptor", &[(Norepinephrine, -0.5), (Adrenaline, -0.3)], 0.3),
    receptor("beta2", Noradrenergic, "Peripheral adrenergic receptor (hepatic glucose output)", &[(Glucose, 0.2), (Glucagon, 0.2), (Insulin, -0.1)], 0.2),
    receptor("H1", Histaminergic, "Postsynaptic histamine receptor (wake promotion)", &[(Orexin, 0.2), (Acetylcholine, 0.2)], 0.3),
    receptor("H3", Histaminergic, "Histamine autoreceptor", &[(Histamine, -0.5), (Acetylcholine, -0.2)], 0.3),
    receptor("MT1", Melatonergic, "Melatonin receptor (sleep promotion)", &[(Orexin, -0.3), (Histamine, -0.2), (Cortisol, -0.1)], 0.2),
    receptor("MT2", Melatonergic, "Melatonin receptor (SCN phase)", &[(Orexin, -0.2), (Norepinephrine, -0.2)], 0.2),
    receptor("OX2R", Orexinergic, "Orexin receptor driving monoaminergic arousal", &[(Histamine, 0.4), (Norepinephrine, 0.3), (Acetylcholine, 0.2)], 0.3),
    receptor("nAChR", Cholinergic, "Nicotinic acetylcholine receptor", &[(Dopamine, 0.3), (Glutamate, 0.2), (Adrenaline, 0.3)], 0.2),
    receptor("CB1", Endocannabinoid, "Presynaptic cannabinoid receptor", &[(Gaba, -0.2), (Glutamate, -0.2), (Ghrelin, 0.3), (Dopamine, 0.1)], 0.2),
    receptor("GR", Endocrine, "Glucocorticoid receptor (HPA negative feedback)", &[(Cortisol, -0.4), (Glucose, 0.3)], 0.4),
    receptor("mu_opioid", Opioid, "Mu opioid receptor", &[(Dopamine, 0.4), (Gaba, -0.3), (Norepinephrine, -0.3)], 0.2),
    receptor("insulin_receptor", Metabolic, "Peripheral insulin receptor (glucose uptake)", &[(Glucose, -0.4)], 0.3),
    // === Transporters ===
    // Torres 2003: reuptake is the dominant clearance route for monoamines
    transporter("DAT", Dopaminergic, "Dopamine transporter", Dopamine),
    transporter("SERT", Serotonergic, "Serotonin transporter", Serotonin),
    transporter("NET", Noradrenergic, "Norepinephrine transporter", Norepinephrine),
    transporter("GAT1", Gabaergic, "GABA transporter 1", Gaba),
    transporter("ENT1", Adenosinergic, "Equilibrative nucleoside transporter", Adenosine),
    // === Enzymes ===
    enzyme("MAO_A", Serotonergic, "Monoamine oxidase A", &[Serotonin, Norepinephrine, Dopamine]),
    enzyme("MAO_B", Dopaminergic, "Monoamine oxidase B", &[Dopamine]),
    enzyme("COMT", Dopaminergic, "Catechol-O-methyltransferase", &[Dopamine, Norepinephrine, Adrenaline]),
    enzyme("AChE", Cholinergic, "Acetylcholinesterase", &[Acetylcholine]),
    enzyme("GABA_T", Gabaergic, "GABA transaminase", &[Gaba]),
    enzyme("ADA", Adenosinergic, "Adenosine deaminase", &[Adenosine]),
    // === Auxiliary pools ===
    pool("tyrosine_pool", Metabolic, "Tyrosine availability for catecholamine synthesis", AuxPool::TyrosinePool),
    pool("tryptophan_pool", Metabolic, "Tryptophan availability for serotonin synthesis", AuxPool::TryptophanPool),
    pool("dopamine_vesicles", Dopaminergic, "VMAT2-loaded dopamine stores", AuxPool::DopamineVesicles),
    pool("serotonin_vesicles", Serotonergic, "VMAT2-loaded serotonin stores", AuxPool::SerotoninVesicles),
    pool("norepinephrine_vesicles", Noradrenergic, "VMAT2-loaded norepinephrine stores", AuxPool::NorepinephrineVesicles),
];

/// A PD target key after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    /// Direct effect on a signal
    Signal(Signal),
    /// Registry entry by index
    Entry(usize),
}

/// Read-only access to the static target table
pub struct TargetRegistry;

impl TargetRegistry {
    /// All entries in index order
    pub fn entries() -> &'static [TargetEntry] {
        TARGETS
    }

    /// Number of entries
    pub fn len() -> usize {
        TARGETS.len()
    }

    pub fn entry(index: usize) -> Option<&'static TargetEntry> {
        TARGETS.get(index)
    }

    pub fn index_of(key: &str) -> Option<usize> {
        TARGETS.iter().position(|e| e.key == key)
    }

    pub fn get(key: &str) -> Option<&'static TargetEntry> {
        TARGETS.iter().find(|e| e.key == key)
    }

    /// Resolve a PD target key: registry entries first, then signal keys
    pub fn resolve(key: &str) -> Option<TargetRef> {
        Self::index_of(key)
            .map(TargetRef::Entry)
            .or_else(|| Signal::from_key(key).map(TargetRef::Signal))
    }

    /// Indices of transporters and enzymes clearing `signal`
    pub fn clearing(signal: Signal) -> impl Iterator<Item = usize> {
        TARGETS
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.clears(signal))
            .map(|(i, _)| i)
    }

    /// Share of `signal`'s clearance carried by each clearing entry
    ///
    /// Reuptake dominates where it exists: transporters take 70% when
    /// enzymes also act on the signal, enzymes split the rest. Shares sum to
    /// 1.0 (or the list is empty).
    pub fn clearance_shares(signal: Signal) -> Vec<(usize, f64)> {
        let (transporters, enzymes): (Vec<usize>, Vec<usize>) =
            Self::clearing(signal).partition(|&i| TARGETS[i].is_transporter());
        let transporter_total = match (transporters.is_empty(), enzymes.is_empty()) {
            (true, _) => 0.0,
            (false, true) => 1.0,
            (false, false) => TRANSPORTER_CLEARANCE_SHARE,
        };
        let mut shares = Vec::with_capacity(transporters.len() + enzymes.len());
        for &i in &transporters {
            shares.push((i, transporter_total / transporters.len() as f64));
        }
        for &i in &enzymes {
            shares.push((i, (1.0 - transporter_total) / enzymes.len() as f64));
        }
        shares
    }
}

const TRANSPORTER_CLEARANCE_SHARE: f64 = 0.7;

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Signal(s) => write!(f, "{}", s),
            TargetRef::Entry(i) => match TARGETS.get(*i) {
                Some(e) => f.write_str(e.key),
                None => write!(f, "#{}", i),
            },
        }
    }
}
