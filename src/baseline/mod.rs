//! Baseline generator: circadian setpoints for every signal.
//!
//! `setpoint(signal, minute, context)` is a closed-form periodic function of
//! the circadian minute. Fast dynamics relax toward it with the signal's tau.
//!
//! Context:
//! - chronotype shift (positive = later chronotype, whole rhythm delayed)
//! - sleep/wake state (selects parameter branches for arousal systems)
//! - per-signal profile shifts (amplitude scaling and phase delay)

pub mod phase;
mod rhythms;

pub use phase::{minute_of_day, MINUTES_PER_DAY};

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalValues};

/// Profile-level deformation of one signal's rhythm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineShift {
    /// Multiplier on the deviation from the reference level (1.0 = unchanged)
    pub amplitude: f64,
    /// Delay of the rhythm in minutes (positive = later)
    pub phase_shift_min: f64,
}

impl Default for BaselineShift {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            phase_shift_min: 0.0,
        }
    }
}

impl BaselineShift {
    /// Compose two shifts: amplitudes multiply, phases add
    pub fn compose(self, other: BaselineShift) -> BaselineShift {
        BaselineShift {
            amplitude: self.amplitude * other.amplitude,
            phase_shift_min: self.phase_shift_min + other.phase_shift_min,
        }
    }
}

/// Baseline shift for every signal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaselineShiftTable {
    shifts: [BaselineShift; Signal::COUNT],
}

impl BaselineShiftTable {
    #[inline]
    pub fn get(&self, signal: Signal) -> BaselineShift {
        self.shifts[signal.index()]
    }

    pub fn set(&mut self, signal: Signal, shift: BaselineShift) {
        self.shifts[signal.index()] = shift;
    }
}

/// Everything besides the clock that a setpoint depends on
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaselineContext {
    /// Chronotype delay in minutes (positive = evening type)
    pub chronotype_shift_min: f64,
    /// Whether the subject is asleep at this instant
    pub asleep: bool,
    /// Profile/condition deformations per signal
    pub shifts: BaselineShiftTable,
}

impl BaselineContext {
    pub fn awake() -> Self {
        Self::default()
    }

    pub fn asleep() -> Self {
        Self {
            asleep: true,
            ..Self::default()
        }
    }

    pub fn with_asleep(mut self, asleep: bool) -> Self {
        self.asleep = asleep;
        self
    }
}

/// Circadian setpoint of `signal` at any minute stamp
///
/// Periodic over 1440 minutes and smooth across midnight; clamped to the
/// signal's physiological bounds.
pub fn setpoint(signal: Signal, minute: f64, context: &BaselineContext) -> f64 {
    let shift = context.shifts.get(signal);
    let phase = minute_of_day(minute - context.chronotype_shift_min - shift.phase_shift_min);
    let reference = signal.spec().reference;
    let raw = rhythms::raw_setpoint(signal, phase, context.asleep);
    signal.clamp(reference + shift.amplitude * (raw - reference))
}

/// Setpoints of all signals at once
pub fn setpoints(minute: f64, context: &BaselineContext) -> SignalValues {
    SignalValues::from_fn(|s| setpoint(s, minute, context))
}
