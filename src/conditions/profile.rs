//! Profile adjustments: per-subject deformations of the nominal system.
//!
//! Deltas are additive on multipliers whose nominal value is 1.0
//! (a transporter delta of -0.3 means 70% activity). Baseline shifts deform
//! a signal's circadian rhythm.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::baseline::{BaselineShift, BaselineShiftTable};
use crate::signals::Signal;
use crate::targets::{TargetKind, TargetRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileAdjustments {
    pub baseline_shifts: BTreeMap<Signal, BaselineShift>,
    /// Receptor key -> density delta
    pub receptor_density: BTreeMap<String, f64>,
    /// Receptor key -> sensitivity delta
    pub receptor_sensitivity: BTreeMap<String, f64>,
    /// Transporter key -> activity delta
    pub transporter_activity: BTreeMap<String, f64>,
    /// Enzyme key -> activity delta
    pub enzyme_activity: BTreeMap<String, f64>,
}

fn add_delta(map: &mut BTreeMap<String, f64>, key: &str, delta: f64) {
    *map.entry(key.to_string()).or_insert(0.0) += delta;
}

impl ProfileAdjustments {
    pub fn is_empty(&self) -> bool {
        self.baseline_shifts.is_empty()
            && self.receptor_density.is_empty()
            && self.receptor_sensitivity.is_empty()
            && self.transporter_activity.is_empty()
            && self.enzyme_activity.is_empty()
    }

    /// Fold another set of adjustments into this one
    ///
    /// Baseline shifts compose (amplitudes multiply, phases add); deltas add.
    pub fn merge(&mut self, other: &ProfileAdjustments) {
        for (signal, shift) in &other.baseline_shifts {
            let current = self.baseline_shifts.get(signal).copied().unwrap_or_default();
            self.baseline_shifts.insert(*signal, current.compose(*shift));
        }
        for (k, v) in &other.receptor_density {
            add_delta(&mut self.receptor_density, k, *v);
        }
        for (k, v) in &other.receptor_sensitivity {
            add_delta(&mut self.receptor_sensitivity, k, *v);
        }
        for (k, v) in &other.transporter_activity {
            add_delta(&mut self.transporter_activity, k, *v);
        }
        for (k, v) in &other.enzyme_activity {
            add_delta(&mut self.enzyme_activity, k, *v);
        }
    }

    pub fn shift(mut self, signal: Signal, amplitude: f64, phase_shift_min: f64) -> Self {
        let current = self.baseline_shifts.get(&signal).copied().unwrap_or_default();
        self.baseline_shifts.insert(
            signal,
            current.compose(BaselineShift {
                amplitude,
                phase_shift_min,
            }),
        );
        self
    }

    pub fn density(mut self, receptor: &str, delta: f64) -> Self {
        add_delta(&mut self.receptor_density, receptor, delta);
        self
    }

    pub fn sensitivity(mut self, receptor: &str, delta: f64) -> Self {
        add_delta(&mut self.receptor_sensitivity, receptor, delta);
        self
    }

    pub fn transporter(mut self, transporter: &str, delta: f64) -> Self {
        add_delta(&mut self.transporter_activity, transporter, delta);
        self
    }

    pub fn enzyme(mut self, enzyme: &str, delta: f64) -> Self {
        add_delta(&mut self.enzyme_activity, enzyme, delta);
        self
    }

    /// Per-signal baseline shift table
    pub fn shift_table(&self) -> BaselineShiftTable {
        let mut table = BaselineShiftTable::default();
        for (signal, shift) in &self.baseline_shifts {
            table.set(*signal, *shift);
        }
        table
    }

    /// Multiplier setpoints per registry entry: `(level, sensitivity)`
    ///
    /// Level is density for receptors and activity for transporters and
    /// enzymes. Keys naming the wrong kind of entry (or nothing) are skipped
    /// with a warning. Multipliers are floored at 0.05.
    pub fn entry_setpoints(&self) -> Vec<(f64, f64)> {
        let mut out = vec![(1.0, 1.0); TargetRegistry::len()];
        let mut apply = |map: &BTreeMap<String, f64>, label: &str, accepts: fn(&TargetKind) -> bool, sensitivity: bool| {
            for (key, delta) in map {
                match TargetRegistry::index_of(key) {
                    Some(i) if accepts(&TargetRegistry::entries()[i].kind) => {
                        let slot = &mut out[i];
                        if sensitivity {
                            slot.1 = (slot.1 + delta).max(0.05);
                        } else {
                            slot.0 = (slot.0 + delta).max(0.05);
                        }
                    }
                    _ => log::warn!("Profile {} delta for '{}' ignored: not a matching target", label, key),
                }
            }
        };
        apply(&self.receptor_density, "receptor density", |k| matches!(k, TargetKind::Receptor { .. }), false);
        apply(&self.receptor_sensitivity, "receptor sensitivity", |k| matches!(k, TargetKind::Receptor { .. }), true);
        apply(&self.transporter_activity, "transporter activity", |k| matches!(k, TargetKind::Transporter { .. }), false);
        apply(&self.enzyme_activity, "enzyme activity", |k| matches!(k, TargetKind::Enzyme { .. }), false);
        out
    }
}
