//! Run-prepared right-hand side of the physiology ODE.
//!
//! `SimulationModel` is built once per compute call. Building resolves every
//! intervention instance (PK parameters, PD targets), allocates compartment
//! slots and fixes the profile-dependent setpoints, so evaluating the
//! derivative is pure arithmetic over the current state.
//!
//! Signal derivative, per signal:
//!   baseline + production + transporters + enzymes + coupling
//!   + interventions + receptors + homeostasis
//!
//! References:
//! - Best JA, Nijhout HF, Reed MC. Theor Biol Med Model. 2009;6:21 (vesicular release, reuptake)
//! - Ross EM, Kenakin TP. Goodman & Gilman's, 10th ed. 2001, ch. 2 (operational receptor model)
//! - Gainetdinov RR, Caron MG. Annu Rev Pharmacol Toxicol. 2003;43:261-284 (adaptive desensitisation)

use log::{debug, warn};

use super::terms::DerivativeTerms;
use crate::baseline::{self, BaselineContext, BaselineShiftTable};
use crate::compute::InterventionInstance;
use crate::conditions::ProfileAdjustments;
use crate::coupling::CouplingGraph;
use crate::gate::DebugFlags;
use crate::homeostasis::EffectiveLevels;
use crate::pharmacology::pk::CompartmentValues;
use crate::pharmacology::{occupancy, resolve_pk, Mechanism, Molecule, PdEffect, PkParameters, SLEEP_KEY};
use crate::signals::{AuxPool, AuxValues, Signal, SignalValues};
use crate::state::{AdaptationLevel, Compartment, CompartmentLayout, InstanceKey, SimulationState, StateDerivative};
use crate::subject::{HabitualSleep, Physiology, Subject};
use crate::targets::{TargetKind, TargetRef, TargetRegistry};

/// Transporter/enzyme activity never drops below this fraction of nominal
pub const ACTIVITY_FLOOR: f64 = 0.05;

/// Fraction of the vesicle deviation passed on to release
const RELEASE_GAIN: f64 = 0.5;

/// Vesicle depletion per minute per reference unit of release above setpoint
const VESICLE_DRAIN_PER_MIN: f64 = 0.002;

/// What the model is built from
pub struct ModelInputs<'a> {
    pub instances: &'a [InterventionInstance],
    pub subject: &'a Subject,
    pub physiology: Physiology,
    /// Profile with conditions and subject overlays already merged
    pub profile: &'a ProfileAdjustments,
    pub flags: DebugFlags,
}

/// One instance with its PK resolved
#[derive(Debug, Clone)]
struct ModelInstance {
    key: InstanceKey,
    intervention_key: String,
    start: f64,
    end: f64,
    dose_mg: f64,
    pk: PkParameters,
    molecule: Option<Molecule>,
    /// Zero-duration substance dose into the depot
    bolus: bool,
}

impl ModelInstance {
    #[inline]
    fn is_active(&self, minute: f64) -> bool {
        minute >= self.start && minute < self.end
    }
}

/// One PD effect bound to its instance and resolved target
#[derive(Debug, Clone)]
struct ModelEffect {
    instance: usize,
    route: TargetRef,
    /// Magnitude already scaled by the instance intensity
    effect: PdEffect,
}

/// Accumulated engagement of one registry entry
#[derive(Debug, Clone, Copy, Default)]
struct TargetDrive {
    agonist: f64,
    antagonist: f64,
    /// Sum of positive minus negative allosteric efficacy
    modulation: f64,
    /// Net orthosteric occupancy, drives density/activity adaptation
    orthosteric: f64,
    /// Net allosteric occupancy, drives sensitivity adaptation
    allosteric: f64,
}

impl TargetDrive {
    #[inline]
    fn modulation_factor(&self) -> f64 {
        (1.0 + self.modulation).max(0.0)
    }

    /// Activity of a transporter or enzyme at adaptation `level`
    #[inline]
    fn activity(&self, level: f64) -> f64 {
        (level * (1.0 + self.agonist - self.antagonist) * self.modulation_factor()).max(ACTIVITY_FLOOR)
    }
}

/// Target engagement of every effect at one state
struct Engagement {
    drives: Vec<TargetDrive>,
    /// Per-minute pool feeds
    pool_feed: AuxValues,
    /// Direct signal rates
    direct: SignalValues,
}

/// Signals and setpoints frozen at a sub-step start; the coupling graph
/// reads only this for every RK stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaggedSnapshot {
    pub signals: SignalValues,
    pub setpoints: SignalValues,
}

/// Run-prepared model
#[derive(Debug, Clone)]
pub struct SimulationModel {
    flags: DebugFlags,
    coupling: CouplingGraph,
    baseline: BaselineContext,
    habitual_sleep: HabitualSleep,
    /// Sleep windows from the request; empty means habitual sleep applies
    sleep_windows: Vec<(f64, f64)>,
    layout: CompartmentLayout,
    instances: Vec<ModelInstance>,
    effects: Vec<ModelEffect>,
    adaptation_setpoints: Vec<AdaptationLevel>,
    /// Clearance shares indexed by signal
    clearance: Vec<Vec<(usize, f64)>>,
    receptors: Vec<usize>,
}

impl SimulationModel {
    pub fn build(inputs: &ModelInputs) -> Self {
        let flags = inputs.flags;
        let shifts = if flags.profiles {
            inputs.profile.shift_table()
        } else {
            BaselineShiftTable::default()
        };
        let baseline = BaselineContext {
            chronotype_shift_min: inputs.subject.sanitized().chronotype_shift_min,
            asleep: false,
            shifts,
        };
        let adaptation_setpoints = if flags.profiles {
            inputs
                .profile
                .entry_setpoints()
                .into_iter()
                .map(|(level, sensitivity)| AdaptationLevel { level, sensitivity })
                .collect()
        } else {
            vec![AdaptationLevel::NOMINAL; TargetRegistry::len()]
        };

        let sleep_windows = inputs
            .instances
            .iter()
            .filter(|i| i.key == SLEEP_KEY && i.duration_minutes > 0.0)
            .map(|i| (i.start_minute, i.end_minute()))
            .collect();

        let mut layout = CompartmentLayout::default();
        let mut instances = Vec::new();
        let mut effects = Vec::new();
        for inst in inputs.instances {
            let pharmacology = match &inst.pharmacology {
                Some(p) => p,
                None => {
                    debug!("Instance {} ({}) has no pharmacology, contributes nothing", inst.id, inst.key);
                    continue;
                }
            };
            if !inst.start_minute.is_finite() {
                warn!("Instance {} has a non-finite start, ignored", inst.id);
                continue;
            }
            let duration = if inst.duration_minutes.is_finite() {
                inst.duration_minutes.max(0.0)
            } else {
                0.0
            };
            if pharmacology.pk.is_activity() && duration <= 0.0 {
                debug!("Zero-length activity {} ignored", inst.id);
                continue;
            }
            let key = inst.instance_key();
            let index = match layout.insert(key.clone()) {
                Some(i) => i,
                None => {
                    warn!("Duplicate intervention instance {}, keeping the first", key);
                    continue;
                }
            };
            let pk = resolve_pk(&pharmacology.pk, pharmacology.dose_mg, &inputs.physiology);
            instances.push(ModelInstance {
                key,
                intervention_key: inst.key.clone(),
                start: inst.start_minute,
                end: inst.start_minute + duration,
                dose_mg: pharmacology.dose_mg,
                bolus: !pk.is_activity() && duration <= 0.0,
                pk,
                molecule: pharmacology.molecule.clone(),
            });

            let intensity = if inst.intensity.is_finite() {
                inst.intensity.max(0.0)
            } else {
                0.0
            };
            for effect in &pharmacology.pd {
                match TargetRegistry::resolve(&effect.target) {
                    Some(route) => {
                        let mut effect = effect.clone();
                        effect.magnitude *= intensity;
                        effects.push(ModelEffect {
                            instance: index,
                            route,
                            effect,
                        });
                    }
                    None => debug!(
                        "Unresolved target '{}' of {} contributes nothing",
                        effect.target, inst.id
                    ),
                }
            }
        }

        let clearance = Signal::ALL.iter().map(|&s| TargetRegistry::clearance_shares(s)).collect();
        let receptors = TargetRegistry::entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_receptor())
            .map(|(i, _)| i)
            .collect();

        Self {
            flags,
            coupling: CouplingGraph::default_graph(),
            baseline,
            habitual_sleep: inputs.subject.habitual_sleep,
            sleep_windows,
            layout,
            instances,
            effects,
            adaptation_setpoints,
            clearance,
            receptors,
        }
    }

    pub fn flags(&self) -> &DebugFlags {
        &self.flags
    }

    pub fn layout(&self) -> &CompartmentLayout {
        &self.layout
    }

    /// Intervention key of the instance at `index`
    pub fn intervention_key(&self, index: usize) -> Option<&str> {
        self.instances.get(index).map(|i| i.intervention_key.as_str())
    }

    /// Whether the instance at `index` is an activity (effect compartment)
    pub fn is_activity(&self, index: usize) -> bool {
        self.instances.get(index).map_or(false, |i| i.pk.is_activity())
    }

    /// Asleep per the request's sleep instances, or the habitual window
    /// when the request carries none
    pub fn is_asleep(&self, minute: f64) -> bool {
        if self.sleep_windows.is_empty() {
            self.habitual_sleep.is_asleep(minute)
        } else {
            self.sleep_windows.iter().any(|&(s, e)| minute >= s && minute < e)
        }
    }

    pub fn setpoints(&self, minute: f64) -> SignalValues {
        let context = self.baseline.with_asleep(self.is_asleep(minute));
        baseline::setpoints(minute, &context)
    }

    /// Coupling snapshot of `state` at its own minute
    pub fn lagged_snapshot(&self, state: &SimulationState) -> LaggedSnapshot {
        LaggedSnapshot {
            signals: state.signals,
            setpoints: self.setpoints(state.minute),
        }
    }

    /// State at `minute`: signals on their setpoints, adaptation at its
    /// setpoints, boluses dosed before `minute` waiting in their depots
    pub fn initial_state(&self, minute: f64) -> SimulationState {
        let mut state = SimulationState::new(
            minute,
            self.setpoints(minute),
            self.layout.slot_count(),
            self.adaptation_setpoints.clone(),
        );
        for (i, inst) in self.instances.iter().enumerate() {
            if inst.bolus && inst.start < minute {
                debug!("Bolus {} precedes the grid, dosed at {}", inst.key, minute);
                state.compartments[CompartmentLayout::slot(i, Compartment::Depot)] += inst.pk.bolus_mg(inst.dose_mg);
            }
        }
        state.sanitize();
        state
    }

    /// Place every bolus dosed in `[from, to)` into its depot
    pub fn inject_boluses(&self, state: &mut SimulationState, from: f64, to: f64) {
        for (i, inst) in self.instances.iter().enumerate() {
            if inst.bolus && inst.start >= from && inst.start < to {
                let slot = CompartmentLayout::slot(i, Compartment::Depot);
                if let Some(depot) = state.compartments.get_mut(slot) {
                    *depot += inst.pk.bolus_mg(inst.dose_mg);
                }
            }
        }
    }

    /// Occupancy-weighted engagement of every effect
    fn engagement(&self, state: &SimulationState) -> Engagement {
        let mut engagement = Engagement {
            drives: vec![TargetDrive::default(); TargetRegistry::len()],
            pool_feed: AuxValues::default(),
            direct: SignalValues::default(),
        };
        if !self.flags.interventions {
            return engagement;
        }

        for me in &self.effects {
            let inst = &self.instances[me.instance];
            let compartment = if inst.pk.is_activity() {
                Compartment::Effect
            } else {
                Compartment::Central
            };
            let level = state.compartment(me.instance, compartment);
            let occ = occupancy(&me.effect, level, inst.molecule.as_ref(), inst.pk.reference_level());
            if occ <= 0.0 {
                continue;
            }
            let mechanism = me.effect.mechanism;
            let efficacy = occ * me.effect.magnitude;

            match me.route {
                TargetRef::Signal(signal) => {
                    // Modulators need a target to modulate
                    if mechanism.is_allosteric() {
                        continue;
                    }
                    let tau = me
                        .effect
                        .tau_min
                        .filter(|t| *t > 0.0)
                        .unwrap_or_else(|| signal.spec().tau_min);
                    engagement.direct.add(signal, mechanism.sign() * efficacy / tau);
                }
                TargetRef::Entry(index) => {
                    let entry = match TargetRegistry::entry(index) {
                        Some(e) => e,
                        None => continue,
                    };
                    if let TargetKind::Pool { pool } = entry.kind {
                        if !mechanism.is_allosteric() {
                            engagement.pool_feed.add(pool, mechanism.sign() * efficacy);
                        }
                        continue;
                    }
                    let drive = &mut engagement.drives[index];
                    match mechanism {
                        Mechanism::Agonist => {
                            drive.agonist += efficacy;
                            drive.orthosteric += occ;
                        }
                        Mechanism::Antagonist => {
                            drive.antagonist += efficacy;
                            drive.orthosteric -= occ;
                        }
                        Mechanism::PositiveAllosteric => {
                            drive.modulation += efficacy;
                            drive.allosteric += occ;
                        }
                        Mechanism::NegativeAllosteric => {
                            drive.modulation -= efficacy;
                            drive.allosteric -= occ;
                        }
                    }
                }
            }
        }
        engagement
    }

    /// Signals as the homeostasis controller sees them: divided by the
    /// current activity of the transporter clearing them
    ///
    /// With transporters gated off every signal is seen as is.
    pub fn effective_levels(&self, state: &SimulationState) -> EffectiveLevels {
        if !self.flags.transporters {
            return EffectiveLevels::new(&state.signals, |_| 1.0);
        }
        let engagement = self.engagement(state);
        let entries = TargetRegistry::entries();
        EffectiveLevels::new(&state.signals, |signal| {
            let mut activity = 0.0;
            let mut share = 0.0;
            for &(i, s) in &self.clearance[signal.index()] {
                if entries[i].is_transporter() {
                    let level = state.adaptation.get(i).map_or(1.0, |a| a.level);
                    activity += s * engagement.drives[i].activity(level);
                    share += s;
                }
            }
            if share > 0.0 {
                activity / share
            } else {
                1.0
            }
        })
    }

    /// Derivative of the full state, with the signal derivative broken down
    ///
    /// # Arguments
    /// * `state` - State to evaluate at (its minute is ignored)
    /// * `minute` - Evaluation time (RK stage time)
    /// * `lagged` - Sub-step start snapshot feeding the coupling graph
    /// * `corrections` - Homeostasis corrections for the current interval
    pub fn evaluate(
        &self,
        state: &SimulationState,
        minute: f64,
        lagged: &LaggedSnapshot,
        corrections: &SignalValues,
    ) -> (StateDerivative, DerivativeTerms) {
        let flags = &self.flags;
        let entries = TargetRegistry::entries();
        let setpoints = self.setpoints(minute);
        let engagement = self.engagement(state);
        let drives = &engagement.drives;
        let mut terms = DerivativeTerms::default();
        let mut d = StateDerivative::zeros(self.layout.slot_count());

        // === Baseline relaxation ===
        if flags.baselines {
            for signal in Signal::ALL {
                let spec = signal.spec();
                terms
                    .baseline
                    .set(signal, (setpoints.get(signal) - state.signals.get(signal)) / spec.tau_min);
            }
        }

        // === Coupling (lagged) ===
        if flags.couplings {
            terms.coupling = self.coupling.contributions(&lagged.signals, &lagged.setpoints);
        }

        if flags.interventions {
            terms.interventions = engagement.direct;
        }

        // === Receptors ===
        if flags.receptors {
            for &i in &self.receptors {
                let (couplings, tone) = match entries[i].kind {
                    TargetKind::Receptor { couplings, tone } => (couplings, tone),
                    _ => continue,
                };
                let adaptation = state.adaptation.get(i).copied().unwrap_or(AdaptationLevel::NOMINAL);
                let gain = adaptation.level * adaptation.sensitivity;
                let drive = drives[i];
                let resting = tone * gain - tone;
                let driven = (tone + drive.agonist - drive.antagonist) * drive.modulation_factor() * gain - tone;
                for &(signal, weight) in couplings {
                    let spec = signal.spec();
                    let scale = weight * spec.reference / spec.tau_min;
                    terms.receptors.add(signal, scale * resting);
                    if flags.interventions {
                        terms.interventions.add(signal, scale * (driven - resting));
                    }
                }
            }
        }

        // === Clearance: transporters and enzymes ===
        for signal in Signal::ALL {
            let x = state.signals.get(signal);
            let tau = signal.spec().tau_min;
            for &(i, share) in &self.clearance[signal.index()] {
                let is_transporter = entries[i].is_transporter();
                let enabled = if is_transporter { flags.transporters } else { flags.enzymes };
                if !enabled {
                    continue;
                }
                let level = state
                    .adaptation
                    .get(i)
                    .map_or(1.0, |a| a.level)
                    .max(ACTIVITY_FLOOR);
                let adapted = -x * share * (level - 1.0) / tau;
                if is_transporter {
                    terms.transporters.add(signal, adapted);
                } else {
                    terms.enzymes.add(signal, adapted);
                }
                if flags.interventions {
                    let engaged = drives[i].activity(level);
                    terms.interventions.add(signal, -x * share * (engaged - level) / tau);
                }
            }
        }

        // === Vesicle-limited release and pools ===
        if flags.auxiliary {
            for pool in AuxPool::ALL {
                let v = state.pools.get(pool);
                let rate = match pool.released_signal() {
                    Some(signal) => {
                        let spec = signal.spec();
                        let sp = setpoints.get(signal);
                        terms.production.set(signal, RELEASE_GAIN * (v - 1.0) * sp / spec.tau_min);
                        let target = pool
                            .precursor()
                            .map_or(1.0, |p| state.pools.get(p))
                            .min(AuxPool::MAX_FRACTION);
                        let excess = ((state.signals.get(signal) - sp) / spec.reference).max(0.0);
                        (target - v) / pool.tau_min() - VESICLE_DRAIN_PER_MIN * excess
                    }
                    None => (1.0 - v) / pool.tau_min(),
                };
                d.pools.set(pool, rate + engagement.pool_feed.get(pool));
            }
        }

        if flags.homeostasis {
            terms.homeostasis = *corrections;
        }
        d.signals = terms.total();

        // === PK compartments ===
        for (i, inst) in self.instances.iter().enumerate() {
            let values = CompartmentValues {
                depot: state.compartment(i, Compartment::Depot),
                central: state.compartment(i, Compartment::Central),
                peripheral: state.compartment(i, Compartment::Peripheral),
                effect: state.compartment(i, Compartment::Effect),
            };
            let active = inst.is_active(minute);
            let input = if !inst.bolus && active {
                inst.pk.infusion_rate(inst.dose_mg, inst.end - inst.start)
            } else {
                0.0
            };
            let rates = inst.pk.rates(&values, input, active);
            d.compartments[CompartmentLayout::slot(i, Compartment::Depot)] = rates.depot;
            d.compartments[CompartmentLayout::slot(i, Compartment::Central)] = rates.central;
            d.compartments[CompartmentLayout::slot(i, Compartment::Peripheral)] = rates.peripheral;
            d.compartments[CompartmentLayout::slot(i, Compartment::Effect)] = rates.effect;
        }

        // === Adaptation ===
        for (i, entry) in entries.iter().enumerate() {
            let kinetics = entry.adaptation;
            if !kinetics.is_adaptive() {
                continue;
            }
            let current = state.adaptation.get(i).copied().unwrap_or(AdaptationLevel::NOMINAL);
            let target = self.adaptation_setpoints.get(i).copied().unwrap_or(AdaptationLevel::NOMINAL);
            let drive = drives[i];
            d.adaptation[i] = AdaptationLevel {
                level: (target.level - current.level) / kinetics.tau_min
                    - kinetics.rate_per_min * drive.orthosteric * current.level,
                sensitivity: (target.sensitivity - current.sensitivity) / kinetics.tau_min
                    - kinetics.rate_per_min * drive.allosteric * current.sensitivity,
            };
        }

        (d, terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pharmacology::InterventionLibrary;

    fn model_with(instances: &[InterventionInstance], flags: DebugFlags) -> SimulationModel {
        let subject = Subject::default();
        let profile = ProfileAdjustments::default();
        SimulationModel::build(&ModelInputs {
            instances,
            subject: &subject,
            physiology: Physiology::derive(&subject),
            profile: &profile,
            flags,
        })
    }

    fn instance(id: &str, key: &str, start: f64, duration: f64) -> InterventionInstance {
        let library = InterventionLibrary::builtin();
        let mut inst = InterventionInstance::new(id, key, start, duration);
        inst.pharmacology = library.resolve(key, &inst.params);
        inst
    }

    #[test]
    fn test_resting_state_is_quiet() {
        let model = model_with(&[], DebugFlags::all());
        let state = model.initial_state(600.0);
        let (d, terms) = model.evaluate(&state, 600.0, &model.lagged_snapshot(&state), &SignalValues::default());
        for signal in Signal::ALL {
            assert!(terms.baseline.get(signal).abs() < 1e-9, "{}", signal);
            assert_eq!(terms.interventions.get(signal), 0.0);
            assert_eq!(terms.transporters.get(signal), 0.0);
        }
        assert!(d.compartments.is_empty());
    }

    #[test]
    fn test_duplicate_instance_keeps_first() {
        let a = instance("coffee", "caffeine", 480.0, 0.0);
        let b = instance("coffee", "caffeine", 480.0, 0.0);
        let model = model_with(&[a, b], DebugFlags::all());
        assert_eq!(model.layout().instance_count(), 1);
    }

    #[test]
    fn test_missing_pharmacology_is_a_no_op() {
        let inst = InterventionInstance::new("mystery", "unknown_thing", 60.0, 0.0);
        let model = model_with(&[inst], DebugFlags::all());
        assert_eq!(model.layout().instance_count(), 0);
    }

    #[test]
    fn test_sleep_instance_overrides_habitual_window() {
        let sleep = instance("night", SLEEP_KEY, 120.0, 240.0);
        let model = model_with(&[sleep], DebugFlags::all());
        // 01:00 is habitual sleep, but the request says sleep starts at 02:00
        assert!(!model.is_asleep(60.0));
        assert!(model.is_asleep(200.0));
        assert!(!model.is_asleep(360.0));

        let habitual = model_with(&[], DebugFlags::all());
        assert!(habitual.is_asleep(60.0));
    }

    #[test]
    fn test_bolus_before_grid_is_in_depot() {
        let inst = instance("coffee", "caffeine", 100.0, 0.0);
        let model = model_with(&[inst], DebugFlags::all());
        let state = model.initial_state(200.0);
        assert!(state.compartment(0, Compartment::Depot) > 0.0);
        let later = model.initial_state(50.0);
        assert_eq!(later.compartment(0, Compartment::Depot), 0.0);
    }

    #[test]
    fn test_interventions_flag_silences_drug_terms() {
        let inst = instance("mph", "methylphenidate", 0.0, 0.0);
        let model = model_with(std::slice::from_ref(&inst), DebugFlags::all().with("interventions", false));
        let mut state = model.initial_state(0.0);
        state.compartments[CompartmentLayout::slot(0, Compartment::Central)] = 0.02;
        let (_, terms) = model.evaluate(&state, 30.0, &model.lagged_snapshot(&state), &SignalValues::default());
        for signal in Signal::ALL {
            assert_eq!(terms.interventions.get(signal), 0.0);
        }

        let on = model_with(&[inst], DebugFlags::all());
        let (_, terms) = on.evaluate(&state, 30.0, &on.lagged_snapshot(&state), &SignalValues::default());
        // Blocked DAT slows clearance, a positive dopamine rate
        assert!(terms.interventions.get(Signal::Dopamine) > 0.0);
    }

    #[test]
    fn test_blocked_reuptake_raises_effective_level() {
        let inst = instance("mph", "methylphenidate", 0.0, 0.0);
        let model = model_with(&[inst], DebugFlags::all());
        let mut state = model.initial_state(0.0);
        state.compartments[CompartmentLayout::slot(0, Compartment::Central)] = 0.02;
        let effective = model.effective_levels(&state);
        assert!(effective.get(Signal::Dopamine) > state.signals.get(Signal::Dopamine));
        assert_eq!(effective.get(Signal::Melatonin), state.signals.get(Signal::Melatonin));
    }

    #[test]
    fn test_gated_transporters_leave_effective_levels_raw() {
        let inst = instance("mph", "methylphenidate", 0.0, 0.0);
        let model = model_with(&[inst], DebugFlags::all().with("transporters", false));
        let mut state = model.initial_state(0.0);
        state.compartments[CompartmentLayout::slot(0, Compartment::Central)] = 0.02;
        let effective = model.effective_levels(&state);
        for signal in Signal::ALL {
            assert_eq!(effective.get(signal), state.signals.get(signal), "{}", signal);
        }
    }

    #[test]
    fn test_coupling_ignores_stage_time() {
        let model = model_with(&[], DebugFlags::all());
        let mut state = model.initial_state(400.0);
        state.signals.set(Signal::Orexin, 400.0);
        state.signals.set(Signal::Cortisol, 20.0);
        let lagged = model.lagged_snapshot(&state);
        let none = SignalValues::default();
        let (_, at_start) = model.evaluate(&state, 400.0, &lagged, &none);
        let (_, at_stage) = model.evaluate(&state, 400.5, &lagged, &none);
        assert_eq!(at_start.coupling, at_stage.coupling);
        assert!(at_start.coupling.iter().any(|(_, v)| v != 0.0));
    }
}
