//! Simulation state.
//!
//! The aggregate of every integrated quantity at one instant:
//! - signal values
//! - auxiliary pools (fractions of nominal capacity)
//! - PK compartments, one block of slots per intervention instance
//! - adaptation multipliers per target registry entry
//!
//! Stepping never mutates a state in place: `advanced_by` returns a new state
//! so the integrator's stepping function stays pure.

mod compartments;

pub use compartments::{Compartment, CompartmentKey, CompartmentLayout, InstanceKey};

use serde::{Deserialize, Serialize};

use crate::signals::{AuxPool, AuxValues, Signal, SignalValues};
use crate::targets::TargetRegistry;

/// Bounds on any adaptation multiplier
pub const ADAPTATION_MIN: f64 = 0.05;
pub const ADAPTATION_MAX: f64 = 5.0;

/// Slow multipliers of one registry entry
///
/// `level` is receptor density for receptors and activity for transporters
/// and enzymes. `sensitivity` only matters for receptors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationLevel {
    pub level: f64,
    pub sensitivity: f64,
}

impl AdaptationLevel {
    pub const NOMINAL: AdaptationLevel = AdaptationLevel {
        level: 1.0,
        sensitivity: 1.0,
    };

    const ZERO: AdaptationLevel = AdaptationLevel {
        level: 0.0,
        sensitivity: 0.0,
    };
}

/// Full integrated state at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub minute: f64,
    pub signals: SignalValues,
    pub pools: AuxValues,
    /// Flat compartment vector laid out by `CompartmentLayout`
    pub compartments: Vec<f64>,
    /// One entry per target registry entry
    pub adaptation: Vec<AdaptationLevel>,
}

/// Time derivative of every component of a `SimulationState`
#[derive(Debug, Clone, PartialEq)]
pub struct StateDerivative {
    pub signals: SignalValues,
    pub pools: AuxValues,
    pub compartments: Vec<f64>,
    pub adaptation: Vec<AdaptationLevel>,
}

impl StateDerivative {
    /// All-zero derivative shaped for `compartment_slots` compartments
    pub fn zeros(compartment_slots: usize) -> Self {
        Self {
            signals: SignalValues::default(),
            pools: AuxValues::default(),
            compartments: vec![0.0; compartment_slots],
            adaptation: vec![AdaptationLevel::ZERO; TargetRegistry::len()],
        }
    }

    /// self += weight * other
    pub fn add_scaled(&mut self, other: &StateDerivative, weight: f64) {
        for signal in Signal::ALL {
            self.signals.add(signal, weight * other.signals.get(signal));
        }
        for pool in AuxPool::ALL {
            self.pools.add(pool, weight * other.pools.get(pool));
        }
        for (a, b) in self.compartments.iter_mut().zip(&other.compartments) {
            *a += weight * b;
        }
        for (a, b) in self.adaptation.iter_mut().zip(&other.adaptation) {
            a.level += weight * b.level;
            a.sensitivity += weight * b.sensitivity;
        }
    }

    /// Classic RK4 weighting: (k1 + 2 k2 + 2 k3 + k4) / 6
    pub fn rk4_combine(k1: &StateDerivative, k2: &StateDerivative, k3: &StateDerivative, k4: &StateDerivative) -> Self {
        let mut out = StateDerivative::zeros(k1.compartments.len());
        out.add_scaled(k1, 1.0 / 6.0);
        out.add_scaled(k2, 2.0 / 6.0);
        out.add_scaled(k3, 2.0 / 6.0);
        out.add_scaled(k4, 1.0 / 6.0);
        out
    }
}

impl SimulationState {
    /// Initial state: signals as given, nominal pools, empty compartments and
    /// adaptation at its setpoints
    pub fn new(minute: f64, signals: SignalValues, compartment_slots: usize, adaptation: Vec<AdaptationLevel>) -> Self {
        let mut adaptation = adaptation;
        adaptation.resize(TargetRegistry::len(), AdaptationLevel::NOMINAL);
        Self {
            minute,
            signals,
            pools: AuxValues::nominal(),
            compartments: vec![0.0; compartment_slots],
            adaptation,
        }
    }

    /// New state `self + h * derivative`, with time advanced by `h`
    pub fn advanced_by(&self, derivative: &StateDerivative, h: f64) -> SimulationState {
        let mut next = self.clone();
        next.minute += h;
        next.signals = SignalValues::from_fn(|s| self.signals.get(s) + h * derivative.signals.get(s));
        next.pools = AuxValues::from_fn(|p| self.pools.get(p) + h * derivative.pools.get(p));
        for (c, d) in next.compartments.iter_mut().zip(&derivative.compartments) {
            *c += h * d;
        }
        for (a, d) in next.adaptation.iter_mut().zip(&derivative.adaptation) {
            a.level += h * d.level;
            a.sensitivity += h * d.sensitivity;
        }
        next
    }

    /// Replace non-finite values with zero, then clamp to valid ranges
    ///
    /// Returns the number of non-finite values that were replaced.
    pub fn sanitize(&mut self) -> usize {
        let mut replaced = 0;
        let mut finite = |v: f64| {
            if v.is_finite() {
                v
            } else {
                replaced += 1;
                0.0
            }
        };

        for signal in Signal::ALL {
            let v = finite(self.signals.get(signal));
            self.signals.set(signal, signal.clamp(v));
        }
        for pool in AuxPool::ALL {
            let v = finite(self.pools.get(pool));
            self.pools.set(pool, v.clamp(0.0, AuxPool::MAX_FRACTION));
        }
        for c in self.compartments.iter_mut() {
            *c = finite(*c).max(0.0);
        }
        for a in self.adaptation.iter_mut() {
            a.level = finite(a.level).clamp(ADAPTATION_MIN, ADAPTATION_MAX);
            a.sensitivity = finite(a.sensitivity).clamp(ADAPTATION_MIN, ADAPTATION_MAX);
        }
        if !self.minute.is_finite() {
            self.minute = 0.0;
            replaced += 1;
        }
        replaced
    }

    /// Value of one compartment of one instance
    #[inline]
    pub fn compartment(&self, instance_index: usize, compartment: Compartment) -> f64 {
        self.compartments
            .get(CompartmentLayout::slot(instance_index, compartment))
            .copied()
            .unwrap_or(0.0)
    }
}
