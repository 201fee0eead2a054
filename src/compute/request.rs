//! Compute request: time grid, intervention instances and run options.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::baseline::MINUTES_PER_DAY;
use crate::conditions::{ConditionRegistry, ConditionSpec, ProfileAdjustments};
use crate::gate::DebugFlags;
use crate::homeostasis::HomeostasisConfig;
use crate::integrator::{IntegrationMethod, IntegratorConfig};
use crate::pharmacology::{InterventionLibrary, Pharmacology};
use crate::state::InstanceKey;
use crate::subject::{PhysiologyOverrides, Subject};

/// Ordered minute stamps at which the response is sampled
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeGrid {
    pub minutes: Vec<f64>,
}

impl TimeGrid {
    pub fn new(minutes: Vec<f64>) -> Self {
        Self { minutes }
    }

    /// `start, start + step, ...` up to and including `end`
    pub fn uniform(start: f64, end: f64, step: f64) -> Self {
        if !(step > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
            warn!("Invalid grid {}..{} step {}, using a single point", start, end, step);
            return Self { minutes: vec![start] };
        }
        let n = ((end - start) / step + 1e-9).floor() as usize;
        Self {
            minutes: (0..=n).map(|i| start + i as f64 * step).collect(),
        }
    }

    /// Whole days from minute 0
    pub fn days(days: f64, step: f64) -> Self {
        Self::uniform(0.0, days * MINUTES_PER_DAY, step)
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    /// Strictly increasing and finite?
    pub fn is_ordered(&self) -> bool {
        self.minutes.iter().all(|m| m.is_finite()) && self.minutes.windows(2).all(|w| w[1] > w[0])
    }
}

fn default_intensity() -> f64 {
    1.0
}

/// One scheduled occurrence of an intervention
///
/// Identity is `(id, start_minute)`: the same id may recur on a multi-day
/// grid and every occurrence keeps its own compartments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionInstance {
    pub id: String,
    /// Library key
    pub key: String,
    pub start_minute: f64,
    /// 0 for an instantaneous dose
    #[serde(default)]
    pub duration_minutes: f64,
    /// Scales every PD magnitude
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    /// Resolved pharmacology; `None` makes the instance a no-op
    #[serde(default)]
    pub pharmacology: Option<Pharmacology>,
}

impl InterventionInstance {
    pub fn new(id: &str, key: &str, start_minute: f64, duration_minutes: f64) -> Self {
        Self {
            id: id.to_string(),
            key: key.to_string(),
            start_minute,
            duration_minutes,
            intensity: 1.0,
            params: BTreeMap::new(),
            pharmacology: None,
        }
    }

    pub fn with_param(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_pharmacology(mut self, pharmacology: Pharmacology) -> Self {
        self.pharmacology = Some(pharmacology);
        self
    }

    pub fn end_minute(&self) -> f64 {
        self.start_minute + self.duration_minutes.max(0.0)
    }

    pub fn is_active(&self, minute: f64) -> bool {
        minute >= self.start_minute && minute < self.end_minute()
    }

    pub fn instance_key(&self) -> InstanceKey {
        InstanceKey::new(&self.id, self.start_minute)
    }

    /// Fill in `pharmacology` from the library if it is missing
    ///
    /// Returns false for an unknown key (the instance stays a no-op).
    pub fn resolve(&mut self, library: &InterventionLibrary) -> bool {
        if self.pharmacology.is_some() {
            return true;
        }
        match library.resolve(&self.key, &self.params) {
            Some(p) => {
                self.pharmacology = Some(p);
                true
            }
            None => {
                warn!("Unknown intervention '{}' for instance {}", self.key, self.id);
                false
            }
        }
    }
}

/// Everything one compute call needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub grid: TimeGrid,
    #[serde(default)]
    pub interventions: Vec<InterventionInstance>,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default)]
    pub physiology: PhysiologyOverrides,
    #[serde(default)]
    pub profile: ProfileAdjustments,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub flags: DebugFlags,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub homeostasis: HomeostasisConfig,
}

impl ComputeRequest {
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    /// Profile with conditions and the subject's cycle overlay folded in
    pub fn effective_profile(&self) -> ProfileAdjustments {
        let mut profile = self.profile.clone();
        profile.merge(&ConditionRegistry::combined_adjustments(&self.conditions));
        let luteal = self.subject.gaba_a_sensitivity_delta();
        if luteal != 0.0 {
            profile.merge(&ProfileAdjustments::default().sensitivity("GABA_A", luteal));
        }
        profile
    }

    /// Resolve every instance lacking pharmacology against `library`
    ///
    /// Returns the number of instances left unresolved.
    pub fn resolve_interventions(&mut self, library: &InterventionLibrary) -> usize {
        self.interventions
            .iter_mut()
            .map(|i| i.resolve(library))
            .filter(|resolved| !resolved)
            .count()
    }
}

/// Fluent construction of a request against an intervention library
pub struct RequestBuilder<'a> {
    library: &'a InterventionLibrary,
    request: ComputeRequest,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(library: &'a InterventionLibrary, grid: TimeGrid) -> Self {
        Self {
            library,
            request: ComputeRequest::new(grid),
        }
    }

    pub fn subject(mut self, subject: Subject) -> Self {
        self.request.subject = subject;
        self
    }

    pub fn physiology(mut self, overrides: PhysiologyOverrides) -> Self {
        self.request.physiology = overrides;
        self
    }

    pub fn profile(mut self, profile: ProfileAdjustments) -> Self {
        self.request.profile = profile;
        self
    }

    pub fn condition(mut self, name: &str, severity: f64) -> Self {
        self.request.conditions.push(ConditionSpec::new(name, severity));
        self
    }

    pub fn flags(mut self, flags: DebugFlags) -> Self {
        self.request.flags = flags;
        self
    }

    pub fn method(mut self, method: IntegrationMethod) -> Self {
        self.request.integrator.method = method;
        self
    }

    pub fn integrator(mut self, config: IntegratorConfig) -> Self {
        self.request.integrator = config;
        self
    }

    pub fn homeostasis(mut self, config: HomeostasisConfig) -> Self {
        self.request.homeostasis = config;
        self
    }

    /// Schedule `key` at `start` with the library's default duration and params
    pub fn intervention(self, id: &str, key: &str, start_minute: f64) -> Self {
        let duration = self.library.get(key).map_or(0.0, |d| d.default_duration_min);
        self.instance(InterventionInstance::new(id, key, start_minute, duration))
    }

    /// Schedule `key` at `start` for `duration` minutes
    pub fn intervention_for(self, id: &str, key: &str, start_minute: f64, duration_minutes: f64) -> Self {
        self.instance(InterventionInstance::new(id, key, start_minute, duration_minutes))
    }

    /// Same intervention every day at the same clock time, one instance per day
    pub fn daily(mut self, id: &str, key: &str, first_start: f64, duration_minutes: f64, days: usize) -> Self {
        for day in 0..days {
            let start = first_start + day as f64 * MINUTES_PER_DAY;
            self = self.intervention_for(id, key, start, duration_minutes);
        }
        self
    }

    /// Add a prepared instance, resolving its pharmacology if missing
    pub fn instance(mut self, mut instance: InterventionInstance) -> Self {
        instance.resolve(self.library);
        self.request.interventions.push(instance);
        self
    }

    pub fn build(self) -> ComputeRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_grid_includes_end() {
        let grid = TimeGrid::uniform(0.0, 60.0, 5.0);
        assert_eq!(grid.len(), 13);
        assert_eq!(grid.minutes.last(), Some(&60.0));
        assert!(grid.is_ordered());
        assert_eq!(TimeGrid::days(2.0, 5.0).len(), 577);
    }

    #[test]
    fn test_unordered_grid_detected() {
        assert!(!TimeGrid::new(vec![0.0, 10.0, 5.0]).is_ordered());
        assert!(!TimeGrid::new(vec![0.0, f64::NAN]).is_ordered());
    }

    #[test]
    fn test_builder_resolves_from_library() {
        let library = InterventionLibrary::builtin();
        let request = RequestBuilder::new(&library, TimeGrid::days(1.0, 5.0))
            .intervention("coffee", "caffeine", 480.0)
            .intervention("walk", "exercise", 1020.0)
            .intervention("mystery", "unobtainium", 600.0)
            .build();
        assert_eq!(request.interventions.len(), 3);
        assert!(request.interventions[0].pharmacology.is_some());
        assert_eq!(request.interventions[1].duration_minutes, 45.0);
        assert!(request.interventions[2].pharmacology.is_none());
    }

    #[test]
    fn test_daily_instances_share_id() {
        let library = InterventionLibrary::builtin();
        let request = RequestBuilder::new(&library, TimeGrid::days(3.0, 5.0))
            .daily("night", "sleep", 1320.0, 480.0, 3)
            .build();
        let keys: Vec<InstanceKey> = request.interventions.iter().map(|i| i.instance_key()).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.id == "night"));
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_effective_profile_merges_conditions() {
        let mut request = ComputeRequest::new(TimeGrid::days(1.0, 5.0));
        assert!(request.effective_profile().is_empty());
        request.conditions.push(ConditionSpec::new("adhd", 0.8));
        assert!(!request.effective_profile().is_empty());
    }

    #[test]
    fn test_request_from_minimal_json() {
        let json = r#"{
            "grid": {"minutes": [0.0, 5.0, 10.0]},
            "interventions": [{"id": "c", "key": "caffeine", "start_minute": 0.0}]
        }"#;
        let request: ComputeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grid.len(), 3);
        assert_eq!(request.interventions[0].intensity, 1.0);
        assert!(request.flags.baselines);
    }
}
